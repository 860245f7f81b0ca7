//! Workflow graph implementation using petgraph.
//!
//! The graph is built once per execution from the workflow document. Node
//! insertion follows document declaration order, so petgraph's node indices
//! double as declaration-order positions. The scheduler relies on this for
//! deterministic tie-breaking.

use crate::definition::Workflow;
use crate::error::GraphError;
use crate::node::Node;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// A directed workflow graph.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    graph: DiGraph<Node, ()>,
    /// Map from node id to petgraph's NodeIndex for O(1) lookup.
    node_index_map: HashMap<String, NodeIndex>,
}

impl WorkflowGraph {
    /// Builds a graph from a workflow document.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::EdgeEndpointMissing` when an edge references a
    /// node id that is not in the document's node collection. The external
    /// layer validates this upstream, but a dangling edge must surface as a
    /// descriptive error here rather than corrupt the schedule.
    pub fn from_definition(workflow: &Workflow) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut node_index_map = HashMap::new();

        for node in &workflow.nodes {
            let index = graph.add_node(node.clone());
            node_index_map.insert(node.id.clone(), index);
        }

        for edge in &workflow.edges {
            let missing_endpoint = |missing: &str| GraphError::EdgeEndpointMissing {
                source: edge.source.clone(),
                target: edge.target.clone(),
                missing: missing.to_string(),
            };
            let source = node_index_map
                .get(&edge.source)
                .ok_or_else(|| missing_endpoint(&edge.source))?;
            let target = node_index_map
                .get(&edge.target)
                .ok_or_else(|| missing_endpoint(&edge.target))?;
            graph.add_edge(*source, *target, ());
        }

        Ok(Self {
            graph,
            node_index_map,
        })
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns node indices in declaration order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Returns the node at the given index.
    ///
    /// # Panics
    ///
    /// Panics if the index did not come from this graph.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.graph[index]
    }

    /// Returns a node by its document id.
    #[must_use]
    pub fn get_node(&self, node_id: &str) -> Option<&Node> {
        let index = self.node_index_map.get(node_id)?;
        self.graph.node_weight(*index)
    }

    /// Number of incoming edges (parallel edges counted individually).
    #[must_use]
    pub fn in_degree(&self, index: NodeIndex) -> usize {
        self.graph
            .edges_directed(index, Direction::Incoming)
            .count()
    }

    /// Successor indices of a node, one entry per outgoing edge.
    #[must_use]
    pub fn successors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| edge.target())
            .collect()
    }

    /// Returns nodes that have no incoming edges (entry points).
    pub fn entry_nodes(&self) -> Vec<&Node> {
        self.graph
            .node_indices()
            .filter(|&idx| self.in_degree(idx) == 0)
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn linear_workflow() -> Workflow {
        Workflow::new("wf")
            .with_node(Node::new("a", "manual_trigger"))
            .with_node(Node::new("b", "set_fields"))
            .with_node(Node::new("c", "set_fields"))
            .with_edge("a", "b")
            .with_edge("b", "c")
    }

    #[test]
    fn builds_from_definition() {
        let graph = WorkflowGraph::from_definition(&linear_workflow()).expect("build");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.get_node("b").is_some());
        assert!(graph.get_node("zzz").is_none());
    }

    #[test]
    fn rejects_dangling_edge_target() {
        let workflow = Workflow::new("wf")
            .with_node(Node::new("a", "manual_trigger"))
            .with_edge("a", "ghost");

        let err = WorkflowGraph::from_definition(&workflow).unwrap_err();
        match err {
            GraphError::EdgeEndpointMissing { missing, .. } => assert_eq!(missing, "ghost"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_dangling_edge_source() {
        let workflow = Workflow::new("wf")
            .with_node(Node::new("a", "manual_trigger"))
            .with_edge("ghost", "a");

        assert!(WorkflowGraph::from_definition(&workflow).is_err());
    }

    #[test]
    fn in_degree_counts_fan_in() {
        let workflow = Workflow::new("wf")
            .with_node(Node::new("a", "manual_trigger"))
            .with_node(Node::new("b", "manual_trigger"))
            .with_node(Node::new("merge", "set_fields"))
            .with_edge("a", "merge")
            .with_edge("b", "merge");

        let graph = WorkflowGraph::from_definition(&workflow).expect("build");
        let merge_idx = graph
            .node_indices()
            .find(|&i| graph.node(i).id == "merge")
            .expect("merge index");
        assert_eq!(graph.in_degree(merge_idx), 2);
    }

    #[test]
    fn entry_nodes_have_no_incoming_edges() {
        let graph = WorkflowGraph::from_definition(&linear_workflow()).expect("build");
        let entries = graph.entry_nodes();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "a");
    }

    #[test]
    fn node_indices_follow_declaration_order() {
        let graph = WorkflowGraph::from_definition(&linear_workflow()).expect("build");
        let ids: Vec<&str> = graph
            .node_indices()
            .map(|i| graph.node(i).id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
