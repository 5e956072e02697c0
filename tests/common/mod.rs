//! Fake workflow service for integration tests.
//!
//! Runs an axum server on its own tokio runtime so the blocking
//! clients under test can be driven from the plain test thread.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use flowsync::ApiConfig;
use serde_json::{Value, json};

pub const API_KEY: &str = "test-key";
pub const PAGE_SIZE: usize = 2;

#[derive(Clone, Default)]
pub struct FakeState {
    pub workflows: Arc<Mutex<Vec<Value>>>,
    pub executions: Arc<Mutex<Vec<Value>>>,
    pub next_id: Arc<Mutex<u64>>,
}

impl FakeState {
    pub fn with_workflows(workflows: Vec<Value>) -> Self {
        let state = Self::default();
        *state.workflows.lock().unwrap() = workflows;
        state
    }

    pub fn workflow(
        &self,
        id: &str,
    ) -> Option<Value> {
        self.workflows.lock().unwrap().iter().find(|w| w["id"] == id).cloned()
    }

    fn next_id(&self) -> u64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }
}

pub struct FakeServer {
    _runtime: tokio::runtime::Runtime,
    pub base_url: String,
    pub state: FakeState,
}

impl FakeServer {
    pub fn start(state: FakeState) -> Self {
        Self::with_router(router(state.clone()), state)
    }

    pub fn with_router(
        router: Router,
        state: FakeState,
    ) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread().worker_threads(1).enable_all().build().unwrap();
        let listener = runtime.block_on(tokio::net::TcpListener::bind("127.0.0.1:0")).unwrap();
        let addr = listener.local_addr().unwrap();
        runtime.spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            _runtime: runtime,
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn config(&self) -> ApiConfig {
        config(&self.base_url, API_KEY)
    }
}

pub fn config(
    base_url: &str,
    api_key: &str,
) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        api_key: Some(api_key.to_string()),
        timeout_ms: 5_000,
        ..ApiConfig::default()
    }
}

pub fn workflow(
    id: &str,
    name: &str,
) -> Value {
    json!({
        "id": id,
        "name": name,
        "active": false,
        "nodes": [{"name": "Webhook", "type": "n8n-nodes-base.webhook", "parameters": {"path": id}}],
        "connections": {},
        "settings": {"executionOrder": "v1"}
    })
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response()
}

async fn require_key(
    req: Request,
    next: Next,
) -> Response {
    let authorized = req.headers().get("x-n8n-api-key").and_then(|v| v.to_str().ok()) == Some(API_KEY);
    if authorized {
        next.run(req).await
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "unauthorized"}))).into_response()
    }
}

async fn list_workflows(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let active_only = params.get("active").map(String::as_str) == Some("true");
    let workflows: Vec<Value> = state.workflows.lock().unwrap().iter().filter(|w| !active_only || w["active"] == json!(true)).cloned().collect();

    let offset: usize = params.get("cursor").and_then(|c| c.parse().ok()).unwrap_or(0);
    let page: Vec<Value> = workflows.iter().skip(offset).take(PAGE_SIZE).cloned().collect();
    let next = if offset + PAGE_SIZE < workflows.len() {
        json!((offset + PAGE_SIZE).to_string())
    } else {
        Value::Null
    };
    Json(json!({"data": page, "nextCursor": next})).into_response()
}

async fn get_workflow(
    State(state): State<FakeState>,
    Path(id): Path<String>,
) -> Response {
    match state.workflow(&id) {
        Some(workflow) => Json(workflow).into_response(),
        None => not_found(),
    }
}

async fn create_workflow(
    State(state): State<FakeState>,
    Json(mut body): Json<Value>,
) -> Response {
    body["id"] = json!(format!("wf-{}", state.next_id()));
    body["active"] = json!(false);
    state.workflows.lock().unwrap().push(body.clone());
    Json(body).into_response()
}

async fn update_workflow(
    State(state): State<FakeState>,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut workflows = state.workflows.lock().unwrap();
    match workflows.iter_mut().find(|w| w["id"] == id) {
        Some(existing) => {
            body["id"] = json!(id);
            *existing = body.clone();
            Json(body).into_response()
        }
        None => not_found(),
    }
}

async fn delete_workflow(
    State(state): State<FakeState>,
    Path(id): Path<String>,
) -> Response {
    let mut workflows = state.workflows.lock().unwrap();
    match workflows.iter().position(|w| w["id"] == id) {
        Some(index) => Json(workflows.remove(index)).into_response(),
        None => not_found(),
    }
}

fn set_active(
    state: &FakeState,
    id: &str,
    active: bool,
) -> Response {
    let mut workflows = state.workflows.lock().unwrap();
    match workflows.iter_mut().find(|w| w["id"] == id) {
        Some(workflow) => {
            workflow["active"] = json!(active);
            Json(workflow.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn activate(
    State(state): State<FakeState>,
    Path(id): Path<String>,
) -> Response {
    set_active(&state, &id, true)
}

async fn deactivate(
    State(state): State<FakeState>,
    Path(id): Path<String>,
) -> Response {
    set_active(&state, &id, false)
}

async fn execute(
    State(state): State<FakeState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if state.workflow(&id).is_none() {
        return not_found();
    }
    let execution = json!({
        "id": state.next_id(),
        "finished": true,
        "mode": "manual",
        "status": "success",
        "startedAt": "2025-07-12T09:30:00.000Z",
        "workflowId": id,
        "triggerData": body["triggerData"].clone()
    });
    state.executions.lock().unwrap().push(execution.clone());
    Json(execution).into_response()
}

async fn list_executions(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(100);
    let executions: Vec<Value> = state
        .executions
        .lock()
        .unwrap()
        .iter()
        .filter(|e| params.get("workflowId").is_none_or(|wid| e["workflowId"] == wid.as_str()))
        .take(limit)
        .cloned()
        .collect();
    Json(json!({"data": executions, "nextCursor": null})).into_response()
}

async fn get_execution(
    State(state): State<FakeState>,
    Path(id): Path<String>,
) -> Response {
    let executions = state.executions.lock().unwrap();
    match executions.iter().find(|e| e["id"].to_string() == id) {
        Some(execution) => Json(execution.clone()).into_response(),
        None => not_found(),
    }
}

async fn list_credentials() -> Response {
    Json(json!({
        "data": [{"id": "c1", "name": "Notion account", "type": "notionApi", "createdAt": "2025-07-01T00:00:00.000Z"}],
        "nextCursor": null
    }))
    .into_response()
}

async fn echo_body(
    headers: HeaderMap,
    body: String,
) -> Response {
    let received: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let reply = json!({"received": received, "had_api_key": headers.contains_key("x-n8n-api-key")});
    ([("x-echo", "yes")], Json(reply)).into_response()
}

async fn echo_query(Query(params): Query<HashMap<String, String>>) -> Response {
    Json(json!({"query": params})).into_response()
}

async fn mixed_headers() -> Response {
    Response::builder()
        .header("x-utf", HeaderValue::from_bytes("café".as_bytes()).unwrap())
        .header("set-cookie", "a=1")
        .header("set-cookie", "b=2")
        .body(Body::from("ok"))
        .unwrap()
}

async fn echo_delete() -> Response {
    (StatusCode::OK, "deleted").into_response()
}

pub fn router(state: FakeState) -> Router {
    let api = Router::new()
        .route("/api/v1/workflows", get(list_workflows).post(create_workflow))
        .route("/api/v1/workflows/:id", get(get_workflow).put(update_workflow).delete(delete_workflow))
        .route("/api/v1/workflows/:id/activate", patch(activate))
        .route("/api/v1/workflows/:id/deactivate", patch(deactivate))
        .route("/api/v1/workflows/:id/execute", post(execute))
        .route("/api/v1/executions", get(list_executions))
        .route("/api/v1/executions/:id", get(get_execution))
        .route("/api/v1/credentials", get(list_credentials))
        .route_layer(middleware::from_fn(require_key));

    let hooks = Router::new()
        .route("/webhook/echo", get(echo_query).post(echo_body).put(echo_body).delete(echo_delete))
        .route("/webhook/headers", get(mixed_headers));

    api.merge(hooks).with_state(state)
}

/// Service failing every single-workflow lookup with 500 while still accepting creates.
pub fn failing_lookup_router(state: FakeState) -> Router {
    Router::new()
        .route("/api/v1/workflows", post(create_workflow))
        .route("/api/v1/workflows/:id", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
        .with_state(state)
}

/// Service answering 200 with a non-JSON body on lists and 500 on single workflows.
pub fn broken_router() -> Router {
    Router::new()
        .route("/api/v1/workflows", get(|| async { "<html>maintenance</html>" }))
        .route("/api/v1/workflows/:id", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
}
