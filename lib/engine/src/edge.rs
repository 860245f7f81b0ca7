//! Edge types for workflow graphs.
//!
//! An edge is a directed data dependency: the target node consumes the
//! source node's output. Multiple edges may share a target (fan-in) or a
//! source (fan-out).

use serde::{Deserialize, Serialize};

/// A directed edge between two nodes in a workflow document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// The id of the node whose output is consumed.
    pub source: String,
    /// The id of the node consuming the output.
    pub target: String,
}

impl Edge {
    /// Creates a new edge from `source` to `target`.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
