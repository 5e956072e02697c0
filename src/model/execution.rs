use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::id;

/// Status of a recorded workflow run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Error,
    Running,
    Waiting,
    Canceled,
    Crashed,
    New,
    #[default]
    Unknown,
}

/// One run of a workflow, read-only from the client side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    #[serde(default, deserialize_with = "id::deserialize_opt", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<String>,
    #[serde(default, deserialize_with = "id::deserialize_opt", skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonValue>,
    #[serde(flatten)]
    pub rest: Map<String, JsonValue>,
}

impl Execution {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Parsed status, `Unknown` when absent or unrecognised.
    pub fn state(&self) -> ExecutionStatus {
        self.status.as_deref().and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    pub fn started_at_time(&self) -> Option<DateTime<Utc>> {
        self.started_at.as_deref().and_then(|s| DateTime::parse_from_rfc3339(s).ok()).map(|t| t.with_timezone(&Utc))
    }

    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            JsonValue::Null => None,
            JsonValue::String(s) => Some(s.clone()),
            other => Some(other.get("message").and_then(JsonValue::as_str).unwrap_or("Unknown error").to_string()),
        }
    }
}
