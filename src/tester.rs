//! Inspection and smoke testing of single workflows.

use std::{sync::Arc, thread, time::Duration};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::{
    FlowsyncError, Result, TesterConfig, WorkflowApi,
    model::{Execution, ExecutionStatus, NodeSummary, Workflow, WorkflowStats},
    webhook::{HttpMethod, WebhookClient, WebhookResponse},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDetails {
    pub workflow: Workflow,
    pub executions: Vec<Execution>,
    pub stats: WorkflowStats,
    pub triggers: Vec<NodeSummary>,
    pub webhooks: Vec<NodeSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub execution_id: String,
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub execution: Execution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Response(WebhookResponse),
    Skipped { reason: String },
    Failed { error: FlowsyncError },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookProbe {
    pub node_name: String,
    pub node_type: String,
    pub webhook_url: Option<String>,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

/// Builds `<base>/webhook/<path>`.
pub fn webhook_url(
    base: &Url,
    path: &str,
) -> String {
    format!("{}/webhook/{}", base.as_str().trim_end_matches('/'), path.trim_start_matches('/'))
}

pub struct WorkflowTester {
    api: Arc<dyn WorkflowApi>,
    webhooks: WebhookClient,
    base: Url,
    poll_delay: Duration,
    executions_limit: usize,
}

impl WorkflowTester {
    pub fn new(
        api: Arc<dyn WorkflowApi>,
        webhooks: WebhookClient,
        base: Url,
        config: &TesterConfig,
    ) -> Self {
        Self {
            api,
            webhooks,
            base,
            poll_delay: config.poll_delay(),
            executions_limit: config.executions_limit,
        }
    }

    /// The workflow with its recent executions and a breakdown of its nodes.
    pub fn details(
        &self,
        id: &str,
    ) -> Result<WorkflowDetails> {
        let workflow = self.api.get_workflow(id)?;
        let executions = self.api.list_executions(Some(id), self.executions_limit)?;

        Ok(WorkflowDetails {
            stats: workflow.stats(),
            triggers: workflow.trigger_nodes(),
            webhooks: workflow.webhook_nodes(),
            executions,
            workflow,
        })
    }

    /// Starts a run, waits the poll delay once, then reads back the execution.
    pub fn run(
        &self,
        id: &str,
        input: Option<&JsonValue>,
    ) -> Result<RunOutcome> {
        let handle = self.api.execute_workflow(id, input)?;
        let execution_id = handle.id().ok_or_else(|| FlowsyncError::Decode("execution handle carries no id".to_string()))?.to_string();
        info!("workflow {} execution started: {}", id, execution_id);

        if !self.poll_delay.is_zero() {
            thread::sleep(self.poll_delay);
        }

        let execution = self.api.get_execution(&execution_id)?;
        let status = execution.state();
        match status {
            ExecutionStatus::Success => info!("execution {} succeeded", execution_id),
            ExecutionStatus::Error | ExecutionStatus::Crashed => warn!("execution {} failed: {}", execution_id, execution.error_message().unwrap_or_default()),
            other => info!("execution {} status: {}", execution_id, other),
        }

        Ok(RunOutcome {
            execution_id,
            status,
            error_message: execution.error_message(),
            execution,
        })
    }

    /// Sends a GET to every webhook node of the workflow.
    pub fn probe_webhooks(
        &self,
        id: &str,
    ) -> Result<Vec<WebhookProbe>> {
        let workflow = self.api.get_workflow(id)?;

        let probes = workflow
            .webhook_nodes()
            .into_iter()
            .map(|node| {
                let (webhook_url, outcome) = match node.webhook_path.as_deref() {
                    Some(path) => {
                        let url = webhook_url(&self.base, path);
                        let outcome = match self.webhooks.test_endpoint(&url, HttpMethod::GET, None) {
                            Ok(response) => ProbeOutcome::Response(response),
                            Err(error) => ProbeOutcome::Failed {
                                error,
                            },
                        };
                        (Some(url), outcome)
                    }
                    None => (
                        None,
                        ProbeOutcome::Skipped {
                            reason: "no webhook path found".to_string(),
                        },
                    ),
                };
                WebhookProbe {
                    node_name: node.name,
                    node_type: node.kind,
                    webhook_url,
                    outcome,
                }
            })
            .collect();

        Ok(probes)
    }

    pub fn set_state(
        &self,
        id: &str,
        activate: bool,
    ) -> Result<()> {
        if activate {
            self.api.activate_workflow(id)
        } else {
            self.api.deactivate_workflow(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::MemApi;

    fn tester(api: Arc<MemApi>) -> WorkflowTester {
        let config = TesterConfig {
            poll_delay_ms: 0,
            executions_limit: 2,
        };
        // nothing listens on port 9, probes fail at the transport level
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        WorkflowTester::new(api, WebhookClient::new(Duration::from_secs(2)).unwrap(), base, &config)
    }

    fn demo() -> Workflow {
        Workflow::from_value(json!({
            "id": "w1",
            "name": "Demo",
            "nodes": [
                {"name": "Hook", "type": "n8n-nodes-base.webhook", "parameters": {"path": "demo"}},
                {"name": "Pathless Hook", "type": "n8n-nodes-base.webhook"},
                {"name": "Cron", "type": "n8n-nodes-base.cronTrigger"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_webhook_url() {
        let base = Url::parse("http://localhost:5678/").unwrap();
        assert_eq!(webhook_url(&base, "8f7c07c4"), "http://localhost:5678/webhook/8f7c07c4");
        assert_eq!(webhook_url(&base, "/eval"), "http://localhost:5678/webhook/eval");
    }

    #[test]
    fn test_details() {
        let api = Arc::new(MemApi::with_workflows(vec![demo()]));
        for _ in 0..3 {
            api.execute_workflow("w1", None).unwrap();
        }

        let details = tester(api).details("w1").unwrap();
        assert_eq!(details.stats.total_nodes, 3);
        assert_eq!(details.stats.trigger_nodes, 1);
        assert_eq!(details.stats.webhook_nodes, 2);
        assert_eq!(details.executions.len(), 2);
        assert_eq!(details.triggers[0].name, "Cron");
    }

    #[test]
    fn test_run_reports_status() {
        let api = Arc::new(MemApi::with_workflows(vec![demo()]));
        let outcome = tester(api.clone()).run("w1", Some(&json!({"messages": []}))).unwrap();
        assert_eq!(outcome.status, ExecutionStatus::Success);
        assert!(outcome.error_message.is_none());
        assert_eq!(api.get_execution(&outcome.execution_id).unwrap().workflow_id.as_deref(), Some("w1"));

        assert!(tester(api).run("missing", None).unwrap_err().is_not_found());
    }

    #[test]
    fn test_probe_webhooks() {
        let api = Arc::new(MemApi::with_workflows(vec![demo()]));
        let probes = tester(api).probe_webhooks("w1").unwrap();
        assert_eq!(probes.len(), 2);

        assert_eq!(probes[0].webhook_url.as_deref(), Some("http://127.0.0.1:9/webhook/demo"));
        assert!(matches!(probes[0].outcome, ProbeOutcome::Failed { .. }));
        assert!(probes[1].webhook_url.is_none());
        assert!(matches!(probes[1].outcome, ProbeOutcome::Skipped { .. }));
    }

    #[test]
    fn test_set_state() {
        let api = Arc::new(MemApi::with_workflows(vec![demo()]));
        let tester = tester(api.clone());
        tester.set_state("w1", true).unwrap();
        assert!(api.get_workflow("w1").unwrap().active);
        tester.set_state("w1", false).unwrap();
        assert!(!api.get_workflow("w1").unwrap().active);
    }
}
