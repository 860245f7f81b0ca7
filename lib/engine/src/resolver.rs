//! Input resolution: gathering upstream outputs for a node.
//!
//! A node's input is the set of outputs recorded for its predecessors:
//! the sources of every edge terminating at the node, in edge declaration
//! order. A predecessor contributes iff it has a *recorded* output: an
//! empty or falsy value (`0`, `""`, `{}`, `false`) is a valid output and is
//! included, while a node that never executed contributes nothing. This
//! keeps "not yet produced" distinct from "produced something empty".

use crate::context::ExecutionContext;
use crate::edge::Edge;
use serde_json::Value as JsonValue;

/// The resolved upstream input of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedInput {
    /// No predecessor has a recorded output (entry node, or nothing
    /// produced yet).
    None,
    /// Exactly one predecessor produced output.
    Single(JsonValue),
    /// Multiple predecessors produced output, in edge declaration order.
    Many(Vec<JsonValue>),
}

impl ResolvedInput {
    /// True when no upstream output was found.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Collapses to a single JSON value: the lone value, an array for
    /// fan-in, or `None` when nothing resolved. Executors pick their own
    /// empty default.
    #[must_use]
    pub fn into_value(self) -> Option<JsonValue> {
        match self {
            Self::None => None,
            Self::Single(value) => Some(value),
            Self::Many(values) => Some(JsonValue::Array(values)),
        }
    }

    /// Collapses to a single JSON value, substituting `default` when
    /// nothing resolved.
    #[must_use]
    pub fn into_value_or(self, default: JsonValue) -> JsonValue {
        self.into_value().unwrap_or(default)
    }
}

/// Resolves the input for `node_id` from recorded predecessor outputs.
///
/// Reading is side-effect free: calling this twice against an unchanged
/// context yields an identical value.
#[must_use]
pub fn resolve_input(node_id: &str, edges: &[Edge], context: &ExecutionContext) -> ResolvedInput {
    let mut values: Vec<JsonValue> = Vec::new();

    for edge in edges.iter().filter(|e| e.target == node_id) {
        if let Some(output) = context.node_output(&edge.source) {
            values.push(output.clone());
        }
    }

    match values.len() {
        0 => ResolvedInput::None,
        1 => ResolvedInput::Single(values.remove(0)),
        _ => ResolvedInput::Many(values),
    }
}
