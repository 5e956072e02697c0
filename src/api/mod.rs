//! Remote workflow service access.
//!
//! Provides an abstraction over the service backends:
//! - `ApiClient`: the REST API over HTTP
//! - `MemApi`: an in-memory service for testing

mod client;
mod mem;

use serde_json::Value as JsonValue;
use strum::AsRefStr;

use crate::{
    Result,
    model::{ConnectionInfo, Credential, Execution, Workflow},
};

pub use client::ApiClient;
pub use mem::MemApi;

/// Path segments of the versioned api root.
pub const API_ROOT: [&str; 2] = ["api", "v1"];

/// Version reported by `test_connection`.
pub const API_VERSION: &str = "v1";

/// Resource collections exposed under the api root.
#[derive(Debug, Clone, Copy, AsRefStr, PartialEq, Hash, Eq)]
pub enum Resource {
    #[strum(serialize = "workflows")]
    Workflows,
    #[strum(serialize = "executions")]
    Executions,
    #[strum(serialize = "credentials")]
    Credentials,
}

/// Resource actions of the remote workflow service.
///
/// Every method performs its work synchronously and reports failure
/// through [`crate::FlowsyncError`]; a missing resource is always
/// [`crate::FlowsyncError::NotFound`].
pub trait WorkflowApi: Send + Sync {
    /// Checks that the service answers and the api key is accepted.
    fn test_connection(&self) -> Result<ConnectionInfo>;

    /// Lists workflows, following pagination cursors to the end.
    fn list_workflows(
        &self,
        active_only: bool,
    ) -> Result<Vec<Workflow>>;

    fn get_workflow(
        &self,
        id: &str,
    ) -> Result<Workflow>;

    /// Creates a workflow and returns the document echoed by the service.
    fn create_workflow(
        &self,
        workflow: &Workflow,
    ) -> Result<Workflow>;

    /// Replaces a workflow and returns the document echoed by the service.
    fn update_workflow(
        &self,
        id: &str,
        workflow: &Workflow,
    ) -> Result<Workflow>;

    fn delete_workflow(
        &self,
        id: &str,
    ) -> Result<()>;

    /// Only the status code is checked, the resulting state is not verified.
    fn activate_workflow(
        &self,
        id: &str,
    ) -> Result<()>;

    fn deactivate_workflow(
        &self,
        id: &str,
    ) -> Result<()>;

    /// Triggers a run and returns the initial execution handle without waiting for completion.
    fn execute_workflow(
        &self,
        id: &str,
        input: Option<&JsonValue>,
    ) -> Result<Execution>;

    fn list_executions(
        &self,
        workflow_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Execution>>;

    fn get_execution(
        &self,
        id: &str,
    ) -> Result<Execution>;

    fn list_credentials(&self) -> Result<Vec<Credential>>;
}
