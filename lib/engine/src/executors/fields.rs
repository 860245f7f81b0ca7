//! Field editor executor.
//!
//! Applies an ordered list of `set` / `remove` / `rename` operations to a
//! shallow copy of the resolved input. Non-object input is coerced: the
//! incoming value is preserved under a `data` key so no information is lost.

use crate::context::ExecutionContext;
use crate::error::NodeError;
use crate::executors::NodeExecutor;
use crate::execution::LogLevel;
use crate::node::Node;
use crate::resolver::ResolvedInput;
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

/// Executes `set_fields` nodes.
pub struct SetFieldsExecutor;

impl SetFieldsExecutor {
    /// Coerces the resolved input into an object to edit.
    fn base_object(input: ResolvedInput) -> Map<String, JsonValue> {
        match input.into_value() {
            None | Some(JsonValue::Null) => Map::new(),
            Some(JsonValue::Object(map)) => map,
            Some(other) => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        }
    }

    fn apply(
        object: &mut Map<String, JsonValue>,
        operation: &JsonValue,
        index: usize,
    ) -> Result<(), NodeError> {
        let invalid = |reason: String| NodeError::InvalidConfig {
            field: format!("operations[{index}]"),
            reason,
        };

        let op = operation
            .get("op")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| invalid("missing 'op'".to_string()))?;
        let field = operation
            .get("field")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| invalid("missing 'field'".to_string()))?;

        match op {
            "set" => {
                let value = operation.get("value").cloned().unwrap_or(JsonValue::Null);
                object.insert(field.to_string(), value);
            }
            "remove" => {
                object.remove(field);
            }
            "rename" => {
                let to = operation
                    .get("to")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| invalid("rename requires 'to'".to_string()))?;
                if let Some(value) = object.remove(field) {
                    object.insert(to.to_string(), value);
                }
            }
            other => return Err(invalid(format!("unknown operation '{other}'"))),
        }

        Ok(())
    }
}

#[async_trait]
impl NodeExecutor for SetFieldsExecutor {
    async fn execute(
        &self,
        node: &Node,
        input: ResolvedInput,
        context: &mut ExecutionContext,
    ) -> Result<JsonValue, NodeError> {
        let operations = node
            .config_value("operations")
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default();

        context.log(
            &node.id,
            format!("Applying {} field operation(s)", operations.len()),
            LogLevel::Info,
        );

        let mut object = Self::base_object(input);
        for (index, operation) in operations.iter().enumerate() {
            Self::apply(&mut object, operation, index)?;
        }

        Ok(JsonValue::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn run(node: Node, input: ResolvedInput) -> Result<JsonValue, NodeError> {
        let mut ctx = ExecutionContext::new("wf");
        SetFieldsExecutor.execute(&node, input, &mut ctx).await
    }

    fn node_with_ops(ops: JsonValue) -> Node {
        Node::new("f", "set_fields").with_config("operations", ops)
    }

    #[tokio::test]
    async fn set_adds_and_overwrites_fields() {
        let node = node_with_ops(json!([
            {"op": "set", "field": "a", "value": 1},
            {"op": "set", "field": "b", "value": "x"},
            {"op": "set", "field": "a", "value": 2},
        ]));
        let output = run(node, ResolvedInput::None).await.expect("success");
        assert_eq!(output, json!({"a": 2, "b": "x"}));
    }

    #[tokio::test]
    async fn remove_deletes_field() {
        let node = node_with_ops(json!([{"op": "remove", "field": "gone"}]));
        let input = ResolvedInput::Single(json!({"gone": 1, "kept": 2}));
        let output = run(node, input).await.expect("success");
        assert_eq!(output, json!({"kept": 2}));
    }

    #[tokio::test]
    async fn rename_moves_value() {
        let node = node_with_ops(json!([{"op": "rename", "field": "old", "to": "new"}]));
        let input = ResolvedInput::Single(json!({"old": 42}));
        let output = run(node, input).await.expect("success");
        assert_eq!(output, json!({"new": 42}));
    }

    #[tokio::test]
    async fn rename_of_absent_field_is_a_no_op() {
        let node = node_with_ops(json!([{"op": "rename", "field": "missing", "to": "new"}]));
        let output = run(node, ResolvedInput::Single(json!({"a": 1})))
            .await
            .expect("success");
        assert_eq!(output, json!({"a": 1}));
    }

    #[tokio::test]
    async fn operations_apply_in_order() {
        let node = node_with_ops(json!([
            {"op": "set", "field": "x", "value": 1},
            {"op": "rename", "field": "x", "to": "y"},
            {"op": "set", "field": "x", "value": 2},
        ]));
        let output = run(node, ResolvedInput::None).await.expect("success");
        assert_eq!(output, json!({"y": 1, "x": 2}));
    }

    #[tokio::test]
    async fn scalar_input_is_coerced_under_data_key() {
        let node = node_with_ops(json!([{"op": "set", "field": "extra", "value": true}]));
        let output = run(node, ResolvedInput::Single(json!("hello")))
            .await
            .expect("success");
        assert_eq!(output, json!({"data": "hello", "extra": true}));
    }

    #[tokio::test]
    async fn input_is_not_mutated_upstream() {
        // The executor edits a copy; the context's recorded output for the
        // predecessor is untouched.
        let mut ctx = ExecutionContext::new("wf");
        ctx.set_node_output("p", json!({"keep": 1}));

        let node = node_with_ops(json!([{"op": "remove", "field": "keep"}]));
        let input = ResolvedInput::Single(ctx.node_output("p").cloned().expect("recorded"));
        let output = SetFieldsExecutor
            .execute(&node, input, &mut ctx)
            .await
            .expect("success");

        assert_eq!(output, json!({}));
        assert_eq!(ctx.node_output("p"), Some(&json!({"keep": 1})));
    }

    #[tokio::test]
    async fn no_operations_returns_input_object() {
        let node = Node::new("f", "set_fields");
        let output = run(node, ResolvedInput::Single(json!({"a": 1})))
            .await
            .expect("success");
        assert_eq!(output, json!({"a": 1}));
    }

    #[tokio::test]
    async fn unknown_operation_is_a_config_error() {
        let node = node_with_ops(json!([{"op": "explode", "field": "a"}]));
        let err = run(node, ResolvedInput::None).await.unwrap_err();
        match err {
            NodeError::InvalidConfig { field, reason } => {
                assert_eq!(field, "operations[0]");
                assert!(reason.contains("explode"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
