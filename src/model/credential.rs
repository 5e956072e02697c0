use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::id;

/// Stored authentication material, only ever enumerated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, JsonValue>,
}
