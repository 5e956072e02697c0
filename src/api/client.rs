use std::collections::HashSet;

use reqwest::{
    Method, StatusCode, Url,
    blocking::{Client, Response},
    header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, InvalidHeaderName, InvalidHeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::{Value as JsonValue, json};
use tracing::{info, trace, warn};

use crate::{
    ApiConfig, FlowsyncError, Result,
    model::{ConnectionInfo, Credential, Execution, ListPage, Workflow},
};

use super::{API_ROOT, API_VERSION, Resource, WorkflowApi};

const CURSOR_KEY: &str = "cursor";

/// Blocking client for the workflow service REST API.
///
/// One connection pool is held per client and the api key travels
/// on every request through the configured header.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| FlowsyncError::Config("api key required".to_string()))?;

        let base = Url::parse(config.base_url.trim()).map_err(|err| FlowsyncError::Config(format!("invalid base url '{}': {}", config.base_url, err)))?;
        if base.cannot_be_a_base() {
            return Err(FlowsyncError::Config(format!("base url '{}' cannot carry a path", config.base_url)));
        }

        let header_key: HeaderName = config.api_key_header.parse().map_err(|err: InvalidHeaderName| FlowsyncError::Config(err.to_string()))?;
        let mut header_value: HeaderValue = api_key.parse().map_err(|err: InvalidHeaderValue| FlowsyncError::Config(err.to_string()))?;
        header_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header_key, header_value);

        let http = Client::builder().default_headers(headers).timeout(config.timeout()).build().map_err(|err| FlowsyncError::Config(err.to_string()))?;

        Ok(Self {
            http,
            base,
        })
    }

    /// Base url of the service, the api root is appended per request.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(
        &self,
        segments: &[&str],
    ) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut().map_err(|_| FlowsyncError::Config(format!("base url '{}' cannot carry a path", self.base)))?.pop_if_empty().extend(API_ROOT).extend(segments);
        Ok(url)
    }

    fn send(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&JsonValue>,
    ) -> Result<Response> {
        trace!("api::{}({})", method, url);
        let path = url.path().to_string();

        let mut request = self.http.request(method, url).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let res = request.send()?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FlowsyncError::NotFound(path));
        }
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(FlowsyncError::Protocol {
                status: status.as_u16(),
                body,
            });
        }
        Ok(res)
    }

    fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
        let bytes = res.bytes()?;
        serde_json::from_slice(&bytes).map_err(|err| FlowsyncError::Decode(err.to_string()))
    }

    fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&JsonValue>,
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        Self::decode(self.send(method, url, query, body)?)
    }

    fn request_empty(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<()> {
        let url = self.endpoint(segments)?;
        self.send(method, url, &[], None).map(|_| ())
    }

    /// Follows `nextCursor` until the last page, a repeated cursor ends the walk.
    fn list_paged<T: DeserializeOwned>(
        &self,
        resource: Resource,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut page_query = query.to_vec();
            if let Some(cursor) = &cursor {
                page_query.push((CURSOR_KEY, cursor.clone()));
            }

            let page: ListPage<T> = self.request_json(Method::GET, &[resource.as_ref()], &page_query, None)?;
            let next = page.next_cursor().map(str::to_string);
            items.extend(page.data);

            match next {
                Some(next) if seen.insert(next.clone()) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(items)
    }

    fn to_body(workflow: &Workflow) -> Result<JsonValue> {
        serde_json::to_value(workflow).map_err(|err| FlowsyncError::Invalid(err.to_string()))
    }
}

impl WorkflowApi for ApiClient {
    fn test_connection(&self) -> Result<ConnectionInfo> {
        let page: ListPage<JsonValue> =
            self.request_json(Method::GET, &[Resource::Workflows.as_ref()], &[], None).inspect_err(|err| warn!("connection test failed: {}", err))?;

        Ok(ConnectionInfo {
            workflow_count: page.data.len(),
            api_version: API_VERSION.to_string(),
        })
    }

    fn list_workflows(
        &self,
        active_only: bool,
    ) -> Result<Vec<Workflow>> {
        let query = if active_only {
            vec![("active", "true".to_string())]
        } else {
            vec![]
        };
        self.list_paged(Resource::Workflows, &query).inspect_err(|err| warn!("error fetching workflows: {}", err))
    }

    fn get_workflow(
        &self,
        id: &str,
    ) -> Result<Workflow> {
        self.request_json(Method::GET, &[Resource::Workflows.as_ref(), id], &[], None).inspect_err(|err| warn!("error fetching workflow {}: {}", id, err))
    }

    fn create_workflow(
        &self,
        workflow: &Workflow,
    ) -> Result<Workflow> {
        let body = Self::to_body(workflow)?;
        self.request_json(Method::POST, &[Resource::Workflows.as_ref()], &[], Some(&body)).inspect_err(|err| warn!("error creating workflow: {}", err))
    }

    fn update_workflow(
        &self,
        id: &str,
        workflow: &Workflow,
    ) -> Result<Workflow> {
        let body = Self::to_body(workflow)?;
        self.request_json(Method::PUT, &[Resource::Workflows.as_ref(), id], &[], Some(&body)).inspect_err(|err| warn!("error updating workflow {}: {}", id, err))
    }

    fn delete_workflow(
        &self,
        id: &str,
    ) -> Result<()> {
        self.request_empty(Method::DELETE, &[Resource::Workflows.as_ref(), id])
            .inspect(|_| info!("deleted workflow {}", id))
            .inspect_err(|err| warn!("error deleting workflow {}: {}", id, err))
    }

    fn activate_workflow(
        &self,
        id: &str,
    ) -> Result<()> {
        self.request_empty(Method::PATCH, &[Resource::Workflows.as_ref(), id, "activate"])
            .inspect(|_| info!("activated workflow {}", id))
            .inspect_err(|err| warn!("error activating workflow {}: {}", id, err))
    }

    fn deactivate_workflow(
        &self,
        id: &str,
    ) -> Result<()> {
        self.request_empty(Method::PATCH, &[Resource::Workflows.as_ref(), id, "deactivate"])
            .inspect(|_| info!("deactivated workflow {}", id))
            .inspect_err(|err| warn!("error deactivating workflow {}: {}", id, err))
    }

    fn execute_workflow(
        &self,
        id: &str,
        input: Option<&JsonValue>,
    ) -> Result<Execution> {
        let body = json!({ "triggerData": input.cloned().unwrap_or_else(|| json!({})) });
        self.request_json(Method::POST, &[Resource::Workflows.as_ref(), id, "execute"], &[], Some(&body))
            .inspect_err(|err| warn!("error executing workflow {}: {}", id, err))
    }

    fn list_executions(
        &self,
        workflow_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Execution>> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(workflow_id) = workflow_id {
            query.push(("workflowId", workflow_id.to_string()));
        }
        let page: ListPage<Execution> =
            self.request_json(Method::GET, &[Resource::Executions.as_ref()], &query, None).inspect_err(|err| warn!("error fetching executions: {}", err))?;
        Ok(page.data)
    }

    fn get_execution(
        &self,
        id: &str,
    ) -> Result<Execution> {
        self.request_json(Method::GET, &[Resource::Executions.as_ref(), id], &[], None).inspect_err(|err| warn!("error fetching execution {}: {}", id, err))
    }

    fn list_credentials(&self) -> Result<Vec<Credential>> {
        self.list_paged(Resource::Credentials, &[]).inspect_err(|err| warn!("error fetching credentials: {}", err))
    }
}
