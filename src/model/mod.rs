mod credential;
mod execution;
mod id;
mod node;
mod page;
mod workflow;

pub use credential::Credential;
pub use execution::{Execution, ExecutionStatus};
pub use node::NodeSummary;
pub use page::{ConnectionInfo, ListPage};
pub use workflow::{Workflow, WorkflowStats};
