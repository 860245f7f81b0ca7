//! Dependency scheduling: deterministic topological ordering.
//!
//! The scheduler is a pure static sort over the graph; it does not consult
//! node types, so conditional (`if`) nodes do not short-circuit branches:
//! every node in the graph is always scheduled, and branch outcomes are
//! informational data for downstream consumers.

use crate::error::GraphError;
use crate::graph::WorkflowGraph;
use petgraph::graph::NodeIndex;
use std::collections::VecDeque;

/// Computes a total execution order consistent with all edge dependencies,
/// using Kahn's algorithm.
///
/// Determinism: the ready queue is FIFO, seeded with in-degree-zero nodes in
/// declaration order; successors that become ready together are enqueued in
/// declaration order. Identical input therefore always yields an identical
/// order.
///
/// # Errors
///
/// Returns `GraphError::CycleDetected` (naming the unscheduled nodes) when
/// no valid total order exists. Nodes are never silently dropped.
pub fn execution_order(graph: &WorkflowGraph) -> Result<Vec<NodeIndex>, GraphError> {
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.in_degree(idx))
        .collect();

    let mut queue: VecDeque<NodeIndex> = graph
        .node_indices()
        .filter(|idx| in_degree[idx.index()] == 0)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());

    while let Some(index) = queue.pop_front() {
        order.push(index);

        // Successors reaching in-degree zero together are enqueued in
        // declaration order, not edge-insertion order.
        let mut ready: Vec<NodeIndex> = Vec::new();
        for successor in graph.successors(index) {
            let degree = &mut in_degree[successor.index()];
            *degree -= 1;
            if *degree == 0 {
                ready.push(successor);
            }
        }
        ready.sort_unstable();
        queue.extend(ready);
    }

    if order.len() != graph.node_count() {
        let scheduled: Vec<usize> = order.iter().map(|idx| idx.index()).collect();
        let unscheduled = graph
            .node_indices()
            .filter(|idx| !scheduled.contains(&idx.index()))
            .map(|idx| graph.node(idx).id.clone())
            .collect();
        return Err(GraphError::CycleDetected { unscheduled });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Workflow;
    use crate::node::Node;

    fn ordered_ids(workflow: &Workflow) -> Result<Vec<String>, GraphError> {
        let graph = WorkflowGraph::from_definition(workflow).expect("build graph");
        let order = execution_order(&graph)?;
        Ok(order
            .into_iter()
            .map(|idx| graph.node(idx).id.clone())
            .collect())
    }

    fn node(id: &str) -> Node {
        Node::new(id, "set_fields")
    }

    #[test]
    fn linear_chain_orders_by_dependency() {
        let workflow = Workflow::new("wf")
            .with_node(node("c"))
            .with_node(node("a"))
            .with_node(node("b"))
            .with_edge("a", "b")
            .with_edge("b", "c");

        assert_eq!(ordered_ids(&workflow).expect("order"), vec!["a", "b", "c"]);
    }

    #[test]
    fn order_length_matches_node_count_for_dag() {
        let workflow = Workflow::new("wf")
            .with_node(node("a"))
            .with_node(node("b"))
            .with_node(node("c"))
            .with_node(node("d"))
            .with_edge("a", "b")
            .with_edge("a", "c")
            .with_edge("b", "d")
            .with_edge("c", "d");

        let ids = ordered_ids(&workflow).expect("order");
        assert_eq!(ids.len(), 4);
        // Every node appears after all nodes with an edge pointing into it.
        let pos = |id: &str| ids.iter().position(|n| n == id).expect("present");
        assert!(pos("a") < pos("b"));
        assert!(pos("a") < pos("c"));
        assert!(pos("b") < pos("d"));
        assert!(pos("c") < pos("d"));
    }

    #[test]
    fn ties_break_by_declaration_order() {
        // b and c both become ready when a completes; declaration order has
        // c before b, so c schedules first.
        let workflow = Workflow::new("wf")
            .with_node(node("a"))
            .with_node(node("c"))
            .with_node(node("b"))
            .with_edge("a", "b")
            .with_edge("a", "c");

        assert_eq!(ordered_ids(&workflow).expect("order"), vec!["a", "c", "b"]);
    }

    #[test]
    fn independent_roots_schedule_in_declaration_order() {
        let workflow = Workflow::new("wf")
            .with_node(node("y"))
            .with_node(node("x"))
            .with_node(node("z"));

        assert_eq!(ordered_ids(&workflow).expect("order"), vec!["y", "x", "z"]);
    }

    #[test]
    fn scheduling_is_deterministic() {
        let workflow = Workflow::new("wf")
            .with_node(node("a"))
            .with_node(node("b"))
            .with_node(node("c"))
            .with_node(node("d"))
            .with_edge("a", "c")
            .with_edge("b", "c")
            .with_edge("c", "d");

        let first = ordered_ids(&workflow).expect("order");
        for _ in 0..10 {
            assert_eq!(ordered_ids(&workflow).expect("order"), first);
        }
    }

    #[test]
    fn cycle_is_detected_and_names_nodes() {
        let workflow = Workflow::new("wf")
            .with_node(node("a"))
            .with_node(node("b"))
            .with_node(node("c"))
            .with_edge("a", "b")
            .with_edge("b", "c")
            .with_edge("c", "a");

        let err = ordered_ids(&workflow).unwrap_err();
        match err {
            GraphError::CycleDetected { unscheduled } => {
                assert_eq!(unscheduled.len(), 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn partial_cycle_schedules_nothing_downstream_of_it() {
        // a is free-standing; b <-> c form a cycle.
        let workflow = Workflow::new("wf")
            .with_node(node("a"))
            .with_node(node("b"))
            .with_node(node("c"))
            .with_edge("b", "c")
            .with_edge("c", "b");

        let err = ordered_ids(&workflow).unwrap_err();
        match err {
            GraphError::CycleDetected { unscheduled } => {
                assert_eq!(unscheduled, vec!["b".to_string(), "c".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let workflow = Workflow::new("wf")
            .with_node(node("a"))
            .with_edge("a", "a");

        assert!(matches!(
            ordered_ids(&workflow),
            Err(GraphError::CycleDetected { .. })
        ));
    }
}
