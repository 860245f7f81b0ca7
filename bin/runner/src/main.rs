//! CLI runner for the copper-relay workflow engine.
//!
//! Loads a workflow document from a JSON file, executes it, and prints the
//! full execution result record as pretty JSON. The process exits 0 when the
//! run succeeded and 1 when it failed, so the runner composes with shell
//! pipelines.

mod config;

use crate::config::RunnerConfig;
use copper_relay_engine::executors::{HttpRequestExecutor, ScriptExecutor};
use copper_relay_engine::{ExecutorRegistry, Workflow, WorkflowExecutor};
use std::fmt;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Errors from loading the workflow document.
#[derive(Debug)]
enum LoadError {
    /// The file could not be read.
    Io { path: String, source: std::io::Error },
    /// The file is not a valid workflow document.
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {path}: {source}"),
            Self::Parse { path, source } => {
                write!(f, "{path} is not a valid workflow document: {source}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Reads and parses a workflow document from disk.
fn load_workflow(path: &str) -> Result<Workflow, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
        path: path.to_string(),
        source,
    })
}

/// Builds the executor registry, applying runner configuration overrides on
/// top of the defaults.
fn build_registry(config: &RunnerConfig) -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::with_defaults();

    registry.register(
        "http_request",
        Arc::new(HttpRequestExecutor::with_timeout(Duration::from_secs(
            config.http.timeout_seconds,
        ))),
    );

    let script = match &config.script.interpreter {
        Some(program) => {
            ScriptExecutor::with_interpreter(program, config.script.interpreter_args.clone())
        }
        None => ScriptExecutor::new(),
    };
    registry.register(
        "transform_js",
        Arc::new(script.with_timeout(Duration::from_secs(config.script.timeout_seconds))),
    );

    registry
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: copper-relay <workflow.json>");
        return ExitCode::from(2);
    };

    let config = match RunnerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::from(2);
        }
    };

    let workflow = match load_workflow(&path) {
        Ok(workflow) => workflow,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    tracing::info!(
        workflow_id = %workflow.id,
        nodes = workflow.nodes.len(),
        edges = workflow.edges.len(),
        "loaded workflow document"
    );

    let executor = WorkflowExecutor::new(build_registry(&config));
    let result = executor.execute(&workflow).await;

    match serde_json::to_string_pretty(&result) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => {
            eprintln!("failed to render execution result: {e}");
            return ExitCode::FAILURE;
        }
    }

    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
