//! # Flowsync
//!
//! Flowsync is a client and file synchronizer for workflow-automation
//! services exposing an n8n-style REST API.
//!
//! ## Core Features
//!
//! - **API Client**: one blocking call per resource action (workflows, executions, credentials)
//! - **Synchronizer**: mirrors workflows to and from a directory of JSON files
//! - **Tagged Failures**: every operation returns a [`FlowsyncError`] that tells the failure kinds apart
//! - **Workflow Tester**: inspects workflows, runs them and probes their webhooks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use flowsync::{ApiClient, Config, Synchronizer};
//!
//! let config = Config::load("flowsync.toml")?;
//! let client = Arc::new(ApiClient::new(&config.api)?);
//!
//! let sync = Synchronizer::new(client, &config.sync.dir, &config.sync.pattern)?;
//! let summary = sync.pull_all()?;
//! println!("{} exported, {} failed", summary.exported, summary.failed);
//! ```

mod api;
mod config;
mod error;
mod model;
pub mod sync;
pub mod tester;
pub mod webhook;

pub use api::{API_ROOT, API_VERSION, ApiClient, MemApi, Resource, WorkflowApi};
pub use config::{ApiConfig, Config, SyncConfig, TesterConfig};
pub use error::FlowsyncError;
pub use model::*;
pub use sync::{PullSummary, PushSummary, Synchronizer};
pub use tester::WorkflowTester;
pub use webhook::{HttpMethod, WebhookClient, WebhookResponse};

/// Result type alias for Flowsync operations.
pub type Result<T> = std::result::Result<T, FlowsyncError>;
