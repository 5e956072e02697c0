//! Ad-hoc requests against trigger endpoints.
//!
//! Unlike [`crate::ApiClient`] these requests carry no api key and any
//! HTTP status is a successful probe: status, body and headers are
//! handed back verbatim for the caller to judge.

use std::{collections::BTreeMap, time::Duration};

use reqwest::{Method, blocking::Client, header::HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{trace, warn};

use crate::{FlowsyncError, Result};

/// Methods accepted by [`WebhookClient::test_endpoint`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl HttpMethod {
    fn method(self) -> Method {
        match self {
            HttpMethod::GET => Method::GET,
            HttpMethod::POST => Method::POST,
            HttpMethod::PUT => Method::PUT,
            HttpMethod::PATCH => Method::PATCH,
            HttpMethod::DELETE => Method::DELETE,
        }
    }

    /// Parses a method name, case-insensitively.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse().map_err(|_| FlowsyncError::Invalid(format!("unsupported method: {}", s)))
    }
}

/// Raw outcome of a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl WebhookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The body parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<JsonValue> {
        serde_json::from_str(&self.body).ok()
    }
}

#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: Client,
}

impl WebhookClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|err| FlowsyncError::Config(err.to_string()))?;
        Ok(Self {
            http,
        })
    }

    /// Issues one request to `url`.
    ///
    /// GET sends the members of an object payload as query parameters,
    /// POST, PUT and PATCH send the payload as a JSON body, DELETE sends
    /// nothing.
    pub fn test_endpoint(
        &self,
        url: &str,
        method: HttpMethod,
        payload: Option<&JsonValue>,
    ) -> Result<WebhookResponse> {
        trace!("webhook::{}({})", method, url);
        let mut request = self.http.request(method.method(), url);

        match (method, payload) {
            (HttpMethod::GET, Some(payload)) => {
                request = request.query(&query_pairs(payload)?);
            }
            (HttpMethod::POST | HttpMethod::PUT | HttpMethod::PATCH, Some(payload)) => {
                request = request.json(payload);
            }
            _ => {}
        }

        let res = request.send().map_err(FlowsyncError::from).inspect_err(|err| warn!("webhook test failed for {}: {}", url, err))?;

        let status_code = res.status().as_u16();
        let headers = collect_headers(res.headers());
        let body = res.text().map_err(FlowsyncError::from)?;

        Ok(WebhookResponse {
            status_code,
            body,
            headers,
        })
    }
}

/// Header values decoded lossily, repeated names joined with `, `.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(name.to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    collected
}

fn query_pairs(payload: &JsonValue) -> Result<Vec<(String, String)>> {
    let object = payload.as_object().ok_or_else(|| FlowsyncError::Invalid("GET payload must be a JSON object".to_string()))?;
    Ok(object
        .iter()
        .map(|(k, v)| {
            let value = match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect())
}
