use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::{FlowsyncError, Result};

use super::{NodeSummary, id};

/// Minimally-typed workflow envelope.
///
/// Only the fields the client needs are typed; node definitions and
/// the connection graph stay untyped and every other member of the
/// document is carried through `rest` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default, deserialize_with = "id::deserialize_opt", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub nodes: Vec<JsonValue>,
    #[serde(default)]
    pub connections: Map<String, JsonValue>,
    #[serde(flatten)]
    pub rest: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStats {
    pub total_nodes: usize,
    pub trigger_nodes: usize,
    pub webhook_nodes: usize,
    pub is_active: bool,
}

impl Workflow {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str::<Workflow>(s).map_err(|e| FlowsyncError::Decode(format!("{}", e)))
    }

    pub fn from_value(value: JsonValue) -> Result<Self> {
        serde_json::from_value::<Workflow>(value).map_err(|e| FlowsyncError::Decode(format!("{}", e)))
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed")
    }

    pub fn node_summaries(&self) -> impl Iterator<Item = NodeSummary> + '_ {
        self.nodes.iter().map(NodeSummary::from_node)
    }

    pub fn trigger_nodes(&self) -> Vec<NodeSummary> {
        self.node_summaries().filter(NodeSummary::is_trigger).collect()
    }

    pub fn webhook_nodes(&self) -> Vec<NodeSummary> {
        self.node_summaries().filter(NodeSummary::is_webhook).collect()
    }

    pub fn stats(&self) -> WorkflowStats {
        WorkflowStats {
            total_nodes: self.nodes.len(),
            trigger_nodes: self.trigger_nodes().len(),
            webhook_nodes: self.webhook_nodes().len(),
            is_active: self.active,
        }
    }
}
