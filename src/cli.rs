use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI arguments for flowsync
#[derive(Parser, Debug)]
#[clap(name = "flowsync")]
#[clap(about = "Manage and mirror workflows of an n8n-style automation service", long_about = None)]
pub struct Args {
    /// Path to a TOML config file
    #[clap(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// API key sent with every API request
    #[clap(long, env = "N8N_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Service base URL (e.g., http://localhost:5678)
    #[clap(long, env = "N8N_BASE_URL", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Directory holding the workflow files
    #[clap(long, env = "FLOWSYNC_DIR", value_name = "DIR", global = true)]
    pub dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Test the connection to the API
    Test,

    /// List workflows
    List {
        /// Show only active workflows
        #[clap(long)]
        active: bool,
    },

    /// Export a workflow to a local file
    Export {
        /// Workflow ID to export
        workflow_id: String,
        /// Output filename, derived from the workflow name by default
        #[clap(long)]
        filename: Option<String>,
    },

    /// Import a local workflow file
    Import {
        /// Workflow file to import, relative to the sync directory
        filename: String,
    },

    /// Export all remote workflows to local files
    SyncFromRemote,

    /// Import all local workflow files
    SyncToRemote,

    /// Show a workflow with its recent executions and node breakdown
    Details {
        workflow_id: String,
    },

    /// Execute a workflow and report the resulting status
    Run {
        workflow_id: String,
        /// JSON input data passed as trigger data
        #[clap(long, value_name = "JSON")]
        input: Option<String>,
    },

    /// Activate a workflow
    Activate {
        workflow_id: String,
    },

    /// Deactivate a workflow
    Deactivate {
        workflow_id: String,
    },

    /// Delete a workflow
    Delete {
        workflow_id: String,
    },

    /// List recent executions
    Executions {
        /// Only executions of this workflow
        #[clap(long, value_name = "ID")]
        workflow: Option<String>,
        #[clap(long, default_value = "20")]
        limit: usize,
    },

    /// List stored credentials
    Credentials,

    /// Send a request to an arbitrary endpoint, such as a webhook
    Webhook {
        url: String,
        #[clap(long, default_value = "POST")]
        method: String,
        /// File holding the JSON payload
        #[clap(long, value_name = "FILE", conflicts_with = "data")]
        payload: Option<PathBuf>,
        /// Inline JSON payload
        #[clap(long, value_name = "JSON")]
        data: Option<String>,
    },

    /// Probe every webhook node of a workflow
    Webhooks {
        workflow_id: String,
    },
}
