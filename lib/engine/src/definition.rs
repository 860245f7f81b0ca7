//! Workflow document model.
//!
//! A workflow document is produced, validated, and persisted by an external
//! API/storage layer; the engine consumes it read-only. Structural
//! validation (unique node ids, schema-conformant per-node config) happens
//! upstream, but the engine still defends against dangling edges and cycles
//! when it builds the execution graph.

use crate::edge::Edge;
use crate::node::Node;
use serde::{Deserialize, Serialize};

fn unknown_id() -> String {
    "unknown".to_string()
}

/// A complete workflow document: identity, nodes, and edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Identifier assigned by the external layer.
    #[serde(default = "unknown_id")]
    pub id: String,
    /// Human-readable name, if the external layer provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The nodes, in declaration order. Declaration order breaks scheduling
    /// ties, so it is meaningful.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// The edges, in declaration order.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Workflow {
    /// Creates an empty workflow with the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Adds a node.
    #[must_use]
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Adds an edge.
    #[must_use]
    pub fn with_edge(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edges.push(Edge::new(source, target));
        self
    }

    /// Returns a node by id, if present.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_builder() {
        let workflow = Workflow::new("wf-1")
            .with_node(Node::new("a", "manual_trigger"))
            .with_node(Node::new("b", "http_request"))
            .with_edge("a", "b");

        assert_eq!(workflow.nodes.len(), 2);
        assert_eq!(workflow.edges.len(), 1);
        assert!(workflow.node("a").is_some());
        assert!(workflow.node("missing").is_none());
    }

    #[test]
    fn workflow_id_defaults_to_unknown() {
        let workflow: Workflow = serde_json::from_str(r#"{"nodes": [], "edges": []}"#)
            .expect("deserialize");
        assert_eq!(workflow.id, "unknown");
    }

    #[test]
    fn workflow_deserializes_document_shape() {
        let workflow: Workflow = serde_json::from_str(
            r#"{
                "id": "wf-42",
                "name": "Morning digest",
                "nodes": [
                    {"id": "t", "type": "manual_trigger"},
                    {"id": "h", "type": "http_request", "config": {"url": "https://example.test"}}
                ],
                "edges": [{"source": "t", "target": "h"}]
            }"#,
        )
        .expect("deserialize");

        assert_eq!(workflow.id, "wf-42");
        assert_eq!(workflow.name.as_deref(), Some("Morning digest"));
        assert_eq!(workflow.nodes[1].config_str("url"), Some("https://example.test"));
    }
}
