use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Name and type of a workflow node, plus its webhook path when it has one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_path: Option<String>,
}

impl NodeSummary {
    pub fn from_node(node: &JsonValue) -> Self {
        let text = |key: &str| node.get(key).and_then(JsonValue::as_str).unwrap_or("Unknown").to_string();
        Self {
            name: text("name"),
            kind: text("type"),
            webhook_path: node.pointer("/parameters/path").and_then(JsonValue::as_str).filter(|p| !p.is_empty()).map(str::to_string),
        }
    }

    /// Trigger nodes are the ones whose type ends with `Trigger`.
    pub fn is_trigger(&self) -> bool {
        self.kind.ends_with("Trigger")
    }

    pub fn is_webhook(&self) -> bool {
        self.kind.to_lowercase().contains("webhook")
    }
}
