//! Error types for the engine crate.
//!
//! Two layers, matching how failures propagate:
//! - `GraphError`: problems with the graph itself (dangling edges, cycles).
//!   Fatal to the whole run; no node executes.
//! - `NodeError`: a single node's failure (missing config, external system
//!   failure, timeout). Node-local; subject to the node's `continueOnFail`
//!   setting.
//!
//! An unknown node type is deliberately *not* an error: the orchestrator
//! records a diagnostic placeholder output instead, since the catalog of
//! integrations grows independently of the engine.

use std::fmt;

/// Errors from building or ordering the workflow graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An edge references a node id that is not in the node collection.
    EdgeEndpointMissing {
        source: String,
        target: String,
        missing: String,
    },
    /// No valid execution order exists; the named nodes participate in or
    /// depend on a cycle.
    CycleDetected { unscheduled: Vec<String> },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EdgeEndpointMissing {
                source,
                target,
                missing,
            } => {
                write!(
                    f,
                    "edge {source} -> {target} references unknown node '{missing}'"
                )
            }
            Self::CycleDetected { unscheduled } => {
                write!(
                    f,
                    "workflow contains a cycle; could not schedule nodes: {}",
                    unscheduled.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Errors from executing a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// One or more required configuration fields are absent or empty.
    ///
    /// All missing fields are reported at once rather than failing on the
    /// first.
    MissingConfig { fields: Vec<String> },
    /// A configuration value is present but unusable.
    InvalidConfig { field: String, reason: String },
    /// An external system (HTTP endpoint, LLM provider, SMTP relay) failed.
    External { reason: String },
    /// A bounded operation exceeded its wall-clock timeout.
    Timeout { seconds: u64 },
    /// A user-supplied script failed: runtime unavailable, non-zero exit,
    /// or unparsable output.
    ScriptFailed { reason: String },
}

impl NodeError {
    /// Convenience constructor for a single missing field.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfig {
            fields: vec![field.into()],
        }
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingConfig { fields } => {
                write!(
                    f,
                    "missing required configuration field(s): {}",
                    fields.join(", ")
                )
            }
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid configuration field '{field}': {reason}")
            }
            Self::External { reason } => write!(f, "external call failed: {reason}"),
            Self::Timeout { seconds } => write!(f, "timed out after {seconds}s"),
            Self::ScriptFailed { reason } => write!(f, "script execution failed: {reason}"),
        }
    }
}

impl std::error::Error for NodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_display_names_the_edge() {
        let err = GraphError::EdgeEndpointMissing {
            source: "a".to_string(),
            target: "ghost".to_string(),
            missing: "ghost".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("a -> ghost"));
        assert!(message.contains("unknown node 'ghost'"));
    }

    #[test]
    fn cycle_error_names_unscheduled_nodes() {
        let err = GraphError::CycleDetected {
            unscheduled: vec!["b".to_string(), "c".to_string()],
        };
        assert!(err.to_string().contains("b, c"));
    }

    #[test]
    fn missing_config_enumerates_all_fields() {
        let err = NodeError::MissingConfig {
            fields: vec!["to".to_string(), "subject".to_string(), "body".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("to, subject, body"));
    }

    #[test]
    fn node_error_display() {
        assert!(
            NodeError::Timeout { seconds: 10 }
                .to_string()
                .contains("10s")
        );
        assert!(
            NodeError::missing_field("url")
                .to_string()
                .contains("url")
        );
    }
}
