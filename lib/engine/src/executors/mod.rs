//! Node executors: the pluggable units of work behind each node type.
//!
//! Each executor consumes a node's configuration plus its resolved upstream
//! input and produces a JSON output value or a `NodeError`. Executors are
//! dispatched through an [`ExecutorRegistry`] that is constructed explicitly
//! and injected into the orchestrator; there is no global registry, so
//! tests can substitute fakes for anything that talks to the outside world.

mod condition;
mod email;
mod fields;
mod http;
mod llm;
mod script;
mod trigger;

pub use condition::IfExecutor;
pub use email::{EmailExecutor, Mailer, MailerError, OutboundEmail, SmtpMailer};
pub use fields::SetFieldsExecutor;
pub use http::HttpRequestExecutor;
pub use llm::{LlmCallExecutor, LlmEndpoints};
pub use script::ScriptExecutor;
pub use trigger::ManualTriggerExecutor;

use crate::context::ExecutionContext;
use crate::error::NodeError;
use crate::node::Node;
use crate::resolver::ResolvedInput;
use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;
use std::sync::Arc;

/// A unit of work keyed by a node-type tag.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// Executes the node, returning its output value.
    ///
    /// Executors log their own activity into the context; the orchestrator
    /// logs start and completion around each call.
    ///
    /// # Errors
    ///
    /// Returns a `NodeError` on any unrecoverable condition: missing
    /// required configuration, external-system failure, or timeout.
    async fn execute(
        &self,
        node: &Node,
        input: ResolvedInput,
        context: &mut ExecutionContext,
    ) -> Result<JsonValue, NodeError>;
}

/// The diagnostic output recorded for a node whose type has no registered
/// executor. Unknown types are not fatal: the integration catalog grows
/// independently of the engine.
#[must_use]
pub fn no_executor_output(node: &Node) -> JsonValue {
    json!({
        "executed": false,
        "type": node.node_type,
        "status": "no_executor_available",
    })
}

/// Registry mapping node-type tags to executor instances.
///
/// Constructed once and passed into the orchestrator.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn NodeExecutor>>,
}

impl ExecutorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in executor registered under its
    /// canonical type tag.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("manual_trigger", Arc::new(ManualTriggerExecutor));
        registry.register("http_request", Arc::new(HttpRequestExecutor::new()));
        registry.register("transform_js", Arc::new(ScriptExecutor::new()));
        registry.register("set_fields", Arc::new(SetFieldsExecutor));
        registry.register("if", Arc::new(IfExecutor));
        registry.register("llm_call", Arc::new(LlmCallExecutor::new()));
        registry.register("send_email", Arc::new(EmailExecutor::new()));
        registry
    }

    /// Registers an executor for a type tag, replacing any previous one.
    pub fn register(&mut self, node_type: impl Into<String>, executor: Arc<dyn NodeExecutor>) {
        self.executors.insert(node_type.into(), executor);
    }

    /// Returns the executor for a type tag, if registered.
    #[must_use]
    pub fn get(&self, node_type: &str) -> Option<&Arc<dyn NodeExecutor>> {
        self.executors.get(node_type)
    }

    /// Number of registered executors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    /// True when no executor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&str> = self.executors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("ExecutorRegistry")
            .field("node_types", &tags)
            .finish()
    }
}
