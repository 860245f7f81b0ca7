//! Execution result records.
//!
//! The `ExecutionResult` is the engine's sole return value: a
//! JSON-serializable record of everything that happened during a run. The
//! caller (an external request-serving layer) stores and serves it; the
//! engine never persists anything itself.

use chrono::{DateTime, Utc};
use copper_relay_core::ExecutionId;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Success,
    Error,
}

/// One entry in the chronological execution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// The node this entry concerns, or `workflow` for engine-level entries.
    pub node_id: String,
    /// Human-readable message.
    pub message: String,
    /// Severity.
    pub level: LogLevel,
}

/// One recorded error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// The node that failed, or `workflow` for engine-level failures.
    pub node_id: String,
    /// Human-readable error message.
    pub error: String,
    /// Optional internal detail (e.g. a transport error chain) attached for
    /// diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// When the error was recorded.
    pub timestamp: DateTime<Utc>,
}

/// The terminal artifact of a workflow execution.
///
/// Always carries the complete log and error list accumulated up to the
/// point of termination; success or failure, callers never receive a
/// truncated record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// True when every node was processed without an unhandled failure.
    pub success: bool,
    /// The id of the executed workflow document.
    pub workflow_id: String,
    /// Engine-generated identifier for this run.
    pub execution_id: ExecutionId,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
    /// Number of nodes processed (executed, skipped, or continued past).
    pub nodes_executed: usize,
    /// Per-node outputs, including skip and continuation markers.
    pub outputs: HashMap<String, JsonValue>,
    /// The full chronological log.
    pub logs: Vec<LogEntry>,
    /// The full error list.
    pub errors: Vec<ErrorRecord>,
    /// On failure, the run-level error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the run finished.
    pub completed_at: DateTime<Utc>,
}

impl ExecutionResult {
    /// True if the run failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// Returns the recorded output for a node, if any.
    #[must_use]
    pub fn output(&self, node_id: &str) -> Option<&JsonValue> {
        self.outputs.get(node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_result() -> ExecutionResult {
        ExecutionResult {
            success: true,
            workflow_id: "wf-1".to_string(),
            execution_id: ExecutionId::new(),
            duration_seconds: 0.25,
            nodes_executed: 2,
            outputs: [("a".to_string(), json!({"ok": true}))].into_iter().collect(),
            logs: vec![LogEntry {
                timestamp: Utc::now(),
                node_id: "a".to_string(),
                message: "done".to_string(),
                level: LogLevel::Success,
            }],
            errors: Vec::new(),
            error: None,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn result_serializes_without_null_error() {
        let result = sample_result();
        let json = serde_json::to_value(&result).expect("serialize");

        assert_eq!(json["success"], json!(true));
        assert_eq!(json["workflow_id"], json!("wf-1"));
        assert_eq!(json["nodes_executed"], json!(2));
        // Absent error is omitted entirely, not serialized as null.
        assert!(json.get("error").is_none());
    }

    #[test]
    fn result_serde_roundtrip() {
        let result = sample_result();
        let json = serde_json::to_string(&result).expect("serialize");
        let parsed: ExecutionResult = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(parsed.success, result.success);
        assert_eq!(parsed.execution_id, result.execution_id);
        assert_eq!(parsed.output("a"), Some(&json!({"ok": true})));
    }

    #[test]
    fn log_level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&LogLevel::Warning).expect("serialize"),
            "\"warning\""
        );
        assert_eq!(
            serde_json::to_string(&LogLevel::Success).expect("serialize"),
            "\"success\""
        );
    }
}
