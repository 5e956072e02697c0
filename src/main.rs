mod cli;

use std::{fs, path::Path, process::ExitCode, sync::Arc};

use clap::Parser;
use flowsync::{
    ApiClient, Config, ExecutionStatus, FlowsyncError, HttpMethod, Result, Synchronizer, WebhookClient, WorkflowApi, WorkflowTester,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Args, Command};

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Logs go to stderr, stdout carries command output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "flowsync=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(api_key) = &args.api_key {
        config.api.api_key = Some(api_key.clone());
    }
    if let Some(base_url) = &args.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(dir) = &args.dir {
        config.sync.dir = dir.clone();
    }
    Ok(config)
}

fn run(args: Args) -> Result<bool> {
    let config = load_config(&args)?;

    match args.command {
        Command::Webhook {
            url,
            method,
            payload,
            data,
        } => fire_webhook(&config, &url, &method, payload.as_deref(), data.as_deref()),
        command => run_api(&config, command),
    }
}

fn run_api(
    config: &Config,
    command: Command,
) -> Result<bool> {
    let client = ApiClient::new(&config.api)?;
    let base = client.base_url().clone();
    let api: Arc<dyn WorkflowApi> = Arc::new(client);

    let synchronizer = || Synchronizer::new(api.clone(), &config.sync.dir, &config.sync.pattern);
    let tester = || -> Result<WorkflowTester> {
        let webhooks = WebhookClient::new(config.api.timeout())?;
        Ok(WorkflowTester::new(api.clone(), webhooks, base.clone(), &config.tester))
    };

    match command {
        Command::Test => print_json(&api.test_connection()?)?,
        Command::List {
            active,
        } => {
            let workflows = api.list_workflows(active)?;
            println!("Found {} workflows:", workflows.len());
            for workflow in &workflows {
                let status = if workflow.active {
                    "active"
                } else {
                    "inactive"
                };
                println!("  {:<8} [{}] {}", status, workflow.id().unwrap_or("-"), workflow.display_name());
            }
        }
        Command::Export {
            workflow_id,
            filename,
        } => {
            let path = synchronizer()?.export_one(&workflow_id, filename.as_deref())?;
            println!("{}", path.display());
        }
        Command::Import {
            filename,
        } => {
            let id = synchronizer()?.import_one(&filename)?;
            println!("{}", id);
        }
        Command::SyncFromRemote => {
            let summary = synchronizer()?.pull_all()?;
            println!("Sync complete: {} exported, {} failed", summary.exported, summary.failed);
            return Ok(summary.failed == 0);
        }
        Command::SyncToRemote => {
            let summary = synchronizer()?.push_all()?;
            println!("Sync complete: {} imported, {} failed", summary.imported, summary.failed);
            return Ok(summary.failed == 0);
        }
        Command::Details {
            workflow_id,
        } => print_json(&tester()?.details(&workflow_id)?)?,
        Command::Run {
            workflow_id,
            input,
        } => {
            let input = input.as_deref().map(parse_json).transpose()?;
            let outcome = tester()?.run(&workflow_id, input.as_ref())?;
            print_json(&outcome)?;
            return Ok(!matches!(outcome.status, ExecutionStatus::Error | ExecutionStatus::Crashed));
        }
        Command::Activate {
            workflow_id,
        } => tester()?.set_state(&workflow_id, true)?,
        Command::Deactivate {
            workflow_id,
        } => tester()?.set_state(&workflow_id, false)?,
        Command::Delete {
            workflow_id,
        } => api.delete_workflow(&workflow_id)?,
        Command::Executions {
            workflow,
            limit,
        } => {
            let executions = api.list_executions(workflow.as_deref(), limit)?;
            println!("Found {} executions:", executions.len());
            for execution in &executions {
                println!(
                    "  {:<8} [{}] workflow {} started {}",
                    execution.state(),
                    execution.id().unwrap_or("-"),
                    execution.workflow_id.as_deref().unwrap_or("-"),
                    execution.started_at.as_deref().unwrap_or("unknown")
                );
            }
        }
        Command::Credentials => {
            let credentials = api.list_credentials()?;
            println!("Found {} credentials:", credentials.len());
            for credential in &credentials {
                println!("  [{}] {} ({})", credential.id, credential.name.as_deref().unwrap_or("Unnamed"), credential.kind.as_deref().unwrap_or("unknown"));
            }
        }
        Command::Webhooks {
            workflow_id,
        } => print_json(&tester()?.probe_webhooks(&workflow_id)?)?,
        Command::Webhook {
            ..
        } => return Err(FlowsyncError::Invalid("webhook does not use the API client".to_string())),
    }

    Ok(true)
}

fn fire_webhook(
    config: &Config,
    url: &str,
    method: &str,
    payload: Option<&Path>,
    data: Option<&str>,
) -> Result<bool> {
    let method = HttpMethod::parse(method)?;
    let payload = match (payload, data) {
        (Some(path), _) => {
            let text = fs::read_to_string(path).map_err(|err| FlowsyncError::LocalIo(format!("failed to read {}: {}", path.display(), err)))?;
            Some(serde_json::from_str::<JsonValue>(&text).map_err(|err| FlowsyncError::LocalIo(format!("invalid JSON in {}: {}", path.display(), err)))?)
        }
        (None, Some(data)) => Some(parse_json(data)?),
        (None, None) => None,
    };

    let client = WebhookClient::new(config.api.timeout())?;
    let response = client.test_endpoint(url, method, payload.as_ref())?;

    println!("Status: {}", response.status_code);
    println!("{}", response.body);
    if response.status_code == 404 {
        tracing::warn!("endpoint not found, make sure the workflow is active");
    }
    Ok(response.is_success())
}

fn parse_json(s: &str) -> Result<JsonValue> {
    serde_json::from_str(s).map_err(|err| FlowsyncError::Invalid(format!("invalid JSON input: {}", err)))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|err| FlowsyncError::Decode(err.to_string()))?;
    println!("{}", text);
    Ok(())
}
