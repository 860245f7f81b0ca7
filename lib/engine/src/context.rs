//! Run-scoped execution state.
//!
//! One `ExecutionContext` exists per execution: it records per-node outputs,
//! an ordered log, and an ordered error list, then is discarded once the
//! result record has been assembled. Persistence of the result is an
//! external collaborator's job.

use crate::execution::{ErrorRecord, LogEntry, LogLevel};
use chrono::{DateTime, Utc};
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;

/// The recorded output for a disabled node.
///
/// Distinct from "no output": downstream nodes resolving a disabled
/// predecessor receive this marker, not an absent value.
#[must_use]
pub fn skip_marker() -> JsonValue {
    json!({"skipped": true, "reason": "disabled"})
}

/// The recorded output for a node that failed but was configured to
/// continue on fail.
#[must_use]
pub fn continuation_marker(error: &str) -> JsonValue {
    json!({"error": error, "continued": true})
}

/// Mutable state for a single workflow execution.
///
/// Execution is strictly sequential, so the context needs no internal
/// synchronization; only the orchestrator and the currently executing node
/// touch it.
#[derive(Debug)]
pub struct ExecutionContext {
    workflow_id: String,
    node_outputs: HashMap<String, JsonValue>,
    execution_log: Vec<LogEntry>,
    errors: Vec<ErrorRecord>,
    start_time: DateTime<Utc>,
}

impl ExecutionContext {
    /// Creates a fresh context; captures the start time.
    #[must_use]
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            node_outputs: HashMap::new(),
            execution_log: Vec::new(),
            errors: Vec::new(),
            start_time: Utc::now(),
        }
    }

    /// The id of the workflow being executed.
    #[must_use]
    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// When this execution started.
    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Appends a log entry. Insertion order is execution order.
    pub fn log(&mut self, node_id: &str, message: impl Into<String>, level: LogLevel) {
        self.execution_log.push(LogEntry {
            timestamp: Utc::now(),
            node_id: node_id.to_string(),
            message: message.into(),
            level,
        });
    }

    /// Records a node's output. Each node executes at most once per run, so
    /// under normal flow this is write-once per node id.
    pub fn set_node_output(&mut self, node_id: &str, output: JsonValue) {
        self.node_outputs.insert(node_id.to_string(), output);
    }

    /// Returns a previously recorded output, if any.
    ///
    /// Absence means the node has not executed (or was never scheduled).
    /// An empty or falsy recorded value is still a recorded value.
    #[must_use]
    pub fn node_output(&self, node_id: &str) -> Option<&JsonValue> {
        self.node_outputs.get(node_id)
    }

    /// Records an error. Errors are appended unconditionally; whether the
    /// run halts is the orchestrator's decision.
    pub fn add_error(&mut self, node_id: &str, error: impl Into<String>, details: Option<String>) {
        self.errors.push(ErrorRecord {
            node_id: node_id.to_string(),
            error: error.into(),
            details,
            timestamp: Utc::now(),
        });
    }

    /// Number of nodes with a recorded output.
    #[must_use]
    pub fn output_count(&self) -> usize {
        self.node_outputs.len()
    }

    /// True if any error has been recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Consumes the context, returning its accumulated pieces for the
    /// result record: outputs, log, errors.
    #[must_use]
    pub fn into_parts(self) -> (HashMap<String, JsonValue>, Vec<LogEntry>, Vec<ErrorRecord>) {
        (self.node_outputs, self.execution_log, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entries_preserve_order() {
        let mut ctx = ExecutionContext::new("wf");
        ctx.log("a", "first", LogLevel::Info);
        ctx.log("b", "second", LogLevel::Success);
        ctx.log("a", "third", LogLevel::Error);

        let (_, log, _) = ctx.into_parts();
        let messages: Vec<&str> = log.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn outputs_are_recorded_per_node() {
        let mut ctx = ExecutionContext::new("wf");
        assert!(ctx.node_output("a").is_none());

        ctx.set_node_output("a", json!({"x": 1}));
        assert_eq!(ctx.node_output("a"), Some(&json!({"x": 1})));
        assert_eq!(ctx.output_count(), 1);
    }

    #[test]
    fn empty_output_is_still_recorded() {
        let mut ctx = ExecutionContext::new("wf");
        ctx.set_node_output("a", json!({}));

        // An empty object is a recorded output, not an absent one.
        assert_eq!(ctx.node_output("a"), Some(&json!({})));
    }

    #[test]
    fn errors_accumulate_with_details() {
        let mut ctx = ExecutionContext::new("wf");
        ctx.add_error("n1", "boom", Some("stack".to_string()));
        ctx.add_error("n2", "bang", None);

        assert!(ctx.has_errors());
        let (_, _, errors) = ctx.into_parts();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].node_id, "n1");
        assert_eq!(errors[0].details.as_deref(), Some("stack"));
        assert_eq!(errors[1].details, None);
    }

    #[test]
    fn skip_marker_shape() {
        let marker = skip_marker();
        assert_eq!(marker["skipped"], json!(true));
        assert_eq!(marker["reason"], json!("disabled"));
    }

    #[test]
    fn continuation_marker_carries_message() {
        let marker = continuation_marker("it broke");
        assert_eq!(marker["error"], json!("it broke"));
        assert_eq!(marker["continued"], json!(true));
    }
}
