//! Shape check for workflow files before they are pushed.

use serde_json::Value as JsonValue;

use crate::{FlowsyncError, Result};

pub fn schema() -> JsonValue {
    serde_json::json!({
        "type": "object",
        "properties": {
            "id": { "type": ["string", "integer", "null"] },
            "name": { "type": ["string", "null"] },
            "active": { "type": "boolean" },
            "nodes": { "type": "array", "items": { "type": "object" } },
            "connections": { "type": "object" }
        }
    })
}

pub fn validate(document: &JsonValue) -> Result<()> {
    jsonschema::validate(&schema(), document).map_err(|err| FlowsyncError::Invalid(err.to_string()))
}
