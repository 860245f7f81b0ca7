//! Workflow orchestrator: drives a complete execution.
//!
//! The run proceeds through `Scheduling -> Running -> {Succeeded, Failed}`:
//! - Scheduling: build the graph and compute the execution order. A cycle or
//!   dangling edge fails the run before any node executes.
//! - Running: execute nodes strictly sequentially in topological order,
//!   applying per-node policy (disabled, continue-on-fail, unknown type).
//! - Terminal: assemble the result record, always carrying the complete
//!   accumulated log and error list.
//!
//! Execution is deliberately sequential even where the DAG would permit
//! parallel branches; node outputs become visible only after the owning
//! executor call fully resolves, so every node sees completed outputs from
//! all of its topological predecessors.

use crate::context::{ExecutionContext, continuation_marker, skip_marker};
use crate::definition::Workflow;
use crate::error::NodeError;
use crate::execution::{ExecutionResult, LogLevel};
use crate::executors::{ExecutorRegistry, no_executor_output};
use crate::graph::WorkflowGraph;
use crate::node::Node;
use crate::resolver::resolve_input;
use crate::scheduler::execution_order;
use chrono::Utc;
use copper_relay_core::ExecutionId;

/// Executes complete workflows against an injected executor registry.
pub struct WorkflowExecutor {
    registry: ExecutorRegistry,
}

impl WorkflowExecutor {
    /// Creates an executor with the given registry.
    #[must_use]
    pub fn new(registry: ExecutorRegistry) -> Self {
        Self { registry }
    }

    /// Creates an executor with all built-in node executors registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExecutorRegistry::with_defaults())
    }

    /// Executes a workflow document and returns the result record.
    ///
    /// This never returns an `Err`: every failure mode is folded into the
    /// result record so the caller always receives the full log and error
    /// list.
    pub async fn execute(&self, workflow: &Workflow) -> ExecutionResult {
        let execution_id = ExecutionId::new();
        let mut context = ExecutionContext::new(&workflow.id);

        tracing::info!(
            workflow_id = %workflow.id,
            execution_id = %execution_id,
            nodes = workflow.nodes.len(),
            "starting workflow execution"
        );

        let graph = match WorkflowGraph::from_definition(workflow) {
            Ok(graph) => graph,
            Err(error) => {
                return Self::finish_failed(execution_id, context, error.to_string(), 0);
            }
        };

        let order = match execution_order(&graph) {
            Ok(order) => order,
            Err(error) => {
                return Self::finish_failed(execution_id, context, error.to_string(), 0);
            }
        };

        let order_ids: Vec<&str> = order.iter().map(|&i| graph.node(i).id.as_str()).collect();
        context.log(
            "workflow",
            format!("Execution order: [{}]", order_ids.join(", ")),
            LogLevel::Info,
        );

        let mut processed = 0;
        for index in &order {
            let node = graph.node(*index);
            processed += 1;
            if let Err(error) = self.run_node(node, workflow, &mut context).await {
                tracing::error!(
                    workflow_id = %workflow.id,
                    node_id = %node.id,
                    error = %error,
                    "workflow run failed"
                );
                return Self::finish_failed(execution_id, context, error.to_string(), processed);
            }
        }

        tracing::info!(
            workflow_id = %workflow.id,
            execution_id = %execution_id,
            nodes_executed = processed,
            "workflow execution completed"
        );
        Self::finish(execution_id, context, true, None, processed)
    }

    /// Processes one node: skip, dispatch, record, and apply failure policy.
    ///
    /// Returns `Err` only for an unhandled failure that must halt the run.
    async fn run_node(
        &self,
        node: &Node,
        workflow: &Workflow,
        context: &mut ExecutionContext,
    ) -> Result<(), NodeError> {
        context.log(
            &node.id,
            format!("Starting execution of {}", node.node_type),
            LogLevel::Info,
        );

        if node.settings.disabled {
            context.log(&node.id, "Node is disabled, skipping", LogLevel::Warning);
            context.set_node_output(&node.id, skip_marker());
            return Ok(());
        }

        let Some(executor) = self.registry.get(&node.node_type) else {
            tracing::warn!(node_id = %node.id, node_type = %node.node_type, "no executor registered");
            context.log(
                &node.id,
                format!("No executor found for {}, recording placeholder", node.node_type),
                LogLevel::Warning,
            );
            context.set_node_output(&node.id, no_executor_output(node));
            return Ok(());
        };

        let input = resolve_input(&node.id, &workflow.edges, context);
        match executor.execute(node, input, context).await {
            Ok(output) => {
                context.set_node_output(&node.id, output);
                context.log(&node.id, "Completed successfully", LogLevel::Success);
                Ok(())
            }
            Err(error) => {
                let message = error.to_string();
                context.add_error(&node.id, &message, Some(format!("{error:?}")));
                context.log(
                    &node.id,
                    format!("Execution failed: {message}"),
                    LogLevel::Error,
                );

                if node.settings.continue_on_fail {
                    context.log(
                        &node.id,
                        "Continuing despite error (continueOnFail=true)",
                        LogLevel::Warning,
                    );
                    context.set_node_output(&node.id, continuation_marker(&message));
                    Ok(())
                } else {
                    Err(error)
                }
            }
        }
    }

    fn finish_failed(
        execution_id: ExecutionId,
        mut context: ExecutionContext,
        error: String,
        processed: usize,
    ) -> ExecutionResult {
        context.add_error("workflow", &error, None);
        Self::finish(execution_id, context, false, Some(error), processed)
    }

    fn finish(
        execution_id: ExecutionId,
        context: ExecutionContext,
        success: bool,
        error: Option<String>,
        processed: usize,
    ) -> ExecutionResult {
        let workflow_id = context.workflow_id().to_string();
        let start_time = context.start_time();
        let completed_at = Utc::now();
        let duration_seconds = (completed_at - start_time).num_milliseconds() as f64 / 1000.0;
        let (outputs, logs, errors) = context.into_parts();

        ExecutionResult {
            success,
            workflow_id,
            execution_id,
            duration_seconds,
            nodes_executed: processed,
            outputs,
            logs,
            errors,
            error,
            completed_at,
        }
    }
}
