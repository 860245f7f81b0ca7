//! Workflow execution engine for the copper-relay platform.
//!
//! This crate takes a workflow document (a directed graph of typed nodes
//! connected by data-dependency edges), computes a valid execution order,
//! runs each node with the outputs of its upstream dependencies as input,
//! and produces a complete execution record even when individual nodes fail.
//!
//! - **Document Model**: nodes, edges, and per-node settings as produced by
//!   an external API/storage layer
//! - **Graph**: directed graph using petgraph, with dangling-edge rejection
//! - **Scheduler**: deterministic Kahn topological ordering with cycle
//!   detection
//! - **Executors**: one pluggable executor per node type, dispatched through
//!   an injected registry
//! - **Orchestrator**: sequential run loop applying disabled and
//!   continue-on-fail policy, assembling the final result record

pub mod context;
pub mod definition;
pub mod edge;
pub mod error;
pub mod execution;
pub mod executors;
pub mod graph;
pub mod node;
pub mod orchestrator;
pub mod resolver;
pub mod scheduler;

pub use context::ExecutionContext;
pub use definition::Workflow;
pub use edge::Edge;
pub use error::{GraphError, NodeError};
pub use execution::{ErrorRecord, ExecutionResult, LogEntry, LogLevel};
pub use executors::{ExecutorRegistry, NodeExecutor};
pub use graph::WorkflowGraph;
pub use node::{Node, NodeSettings};
pub use orchestrator::WorkflowExecutor;
pub use resolver::{ResolvedInput, resolve_input};
