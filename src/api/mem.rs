use std::sync::RwLock;

use chrono::{SecondsFormat, Utc};
use serde_json::Value as JsonValue;

use crate::{
    FlowsyncError, Result,
    model::{ConnectionInfo, Credential, Execution, ExecutionStatus, Workflow},
};

use super::{API_VERSION, Resource, WorkflowApi};

/// In-memory workflow service.
///
/// Workflows keep their insertion order, created workflows get a
/// generated id and executions finish immediately with `success`.
#[derive(Debug, Default)]
pub struct MemApi {
    workflows: RwLock<Vec<Workflow>>,
    executions: RwLock<Vec<Execution>>,
    credentials: RwLock<Vec<Credential>>,
}

fn not_found(
    resource: Resource,
    id: &str,
) -> FlowsyncError {
    FlowsyncError::NotFound(format!("{}/{}", resource.as_ref(), id))
}

impl MemApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the service with workflows stored exactly as given.
    pub fn with_workflows(workflows: Vec<Workflow>) -> Self {
        Self {
            workflows: RwLock::new(workflows),
            ..Self::default()
        }
    }

    pub fn add_credential(
        &self,
        credential: Credential,
    ) {
        self.credentials.write().unwrap().push(credential);
    }

    pub fn workflows(&self) -> Vec<Workflow> {
        self.workflows.read().unwrap().clone()
    }

    fn set_active(
        &self,
        id: &str,
        active: bool,
    ) -> Result<()> {
        let mut workflows = self.workflows.write().unwrap();
        let workflow = workflows.iter_mut().find(|w| w.id() == Some(id)).ok_or_else(|| not_found(Resource::Workflows, id))?;
        workflow.active = active;
        Ok(())
    }
}

impl WorkflowApi for MemApi {
    fn test_connection(&self) -> Result<ConnectionInfo> {
        Ok(ConnectionInfo {
            workflow_count: self.workflows.read().unwrap().len(),
            api_version: API_VERSION.to_string(),
        })
    }

    fn list_workflows(
        &self,
        active_only: bool,
    ) -> Result<Vec<Workflow>> {
        let workflows = self.workflows.read().unwrap();
        Ok(workflows.iter().filter(|w| !active_only || w.active).cloned().collect())
    }

    fn get_workflow(
        &self,
        id: &str,
    ) -> Result<Workflow> {
        let workflows = self.workflows.read().unwrap();
        workflows.iter().find(|w| w.id() == Some(id)).cloned().ok_or_else(|| not_found(Resource::Workflows, id))
    }

    fn create_workflow(
        &self,
        workflow: &Workflow,
    ) -> Result<Workflow> {
        let mut created = workflow.clone();
        created.id = Some(nanoid::nanoid!(16));
        created.active = false;
        self.workflows.write().unwrap().push(created.clone());
        Ok(created)
    }

    fn update_workflow(
        &self,
        id: &str,
        workflow: &Workflow,
    ) -> Result<Workflow> {
        let mut workflows = self.workflows.write().unwrap();
        let existing = workflows.iter_mut().find(|w| w.id() == Some(id)).ok_or_else(|| not_found(Resource::Workflows, id))?;
        let mut updated = workflow.clone();
        updated.id = Some(id.to_string());
        *existing = updated.clone();
        Ok(updated)
    }

    fn delete_workflow(
        &self,
        id: &str,
    ) -> Result<()> {
        let mut workflows = self.workflows.write().unwrap();
        let before = workflows.len();
        workflows.retain(|w| w.id() != Some(id));
        if workflows.len() == before {
            return Err(not_found(Resource::Workflows, id));
        }
        Ok(())
    }

    fn activate_workflow(
        &self,
        id: &str,
    ) -> Result<()> {
        self.set_active(id, true)
    }

    fn deactivate_workflow(
        &self,
        id: &str,
    ) -> Result<()> {
        self.set_active(id, false)
    }

    fn execute_workflow(
        &self,
        id: &str,
        input: Option<&JsonValue>,
    ) -> Result<Execution> {
        self.get_workflow(id)?;

        let mut execution = Execution {
            id: Some(nanoid::nanoid!(8)),
            status: Some(ExecutionStatus::Success.to_string()),
            started_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            workflow_id: Some(id.to_string()),
            ..Execution::default()
        };
        if let Some(input) = input {
            execution.rest.insert("triggerData".to_string(), input.clone());
        }

        self.executions.write().unwrap().push(execution.clone());
        Ok(execution)
    }

    fn list_executions(
        &self,
        workflow_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Execution>> {
        let executions = self.executions.read().unwrap();
        Ok(executions.iter().rev().filter(|e| workflow_id.is_none() || e.workflow_id.as_deref() == workflow_id).take(limit).cloned().collect())
    }

    fn get_execution(
        &self,
        id: &str,
    ) -> Result<Execution> {
        let executions = self.executions.read().unwrap();
        executions.iter().find(|e| e.id() == Some(id)).cloned().ok_or_else(|| not_found(Resource::Executions, id))
    }

    fn list_credentials(&self) -> Result<Vec<Credential>> {
        Ok(self.credentials.read().unwrap().clone())
    }
}
