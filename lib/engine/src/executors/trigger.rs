//! Manual trigger executor.
//!
//! Entry-point node for user-initiated runs. Produces the configured test
//! payload, or a default activation record when none is configured.

use crate::context::ExecutionContext;
use crate::error::NodeError;
use crate::executors::NodeExecutor;
use crate::execution::LogLevel;
use crate::node::Node;
use crate::resolver::ResolvedInput;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value as JsonValue, json};

/// Executes `manual_trigger` nodes. Never fails.
pub struct ManualTriggerExecutor;

impl ManualTriggerExecutor {
    fn default_output() -> JsonValue {
        json!({
            "triggered": true,
            "timestamp": Utc::now().to_rfc3339(),
        })
    }

    /// An empty payload (missing, null, empty string, or empty object)
    /// falls back to the default activation record.
    fn is_empty_payload(payload: &JsonValue) -> bool {
        match payload {
            JsonValue::Null => true,
            JsonValue::String(s) => s.is_empty(),
            JsonValue::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

#[async_trait]
impl NodeExecutor for ManualTriggerExecutor {
    async fn execute(
        &self,
        node: &Node,
        _input: ResolvedInput,
        context: &mut ExecutionContext,
    ) -> Result<JsonValue, NodeError> {
        context.log(&node.id, "Manual trigger activated", LogLevel::Info);

        let payload = match node.config_value("testPayload") {
            None => return Ok(Self::default_output()),
            Some(value) => value.clone(),
        };

        // A string payload that parses cleanly as JSON becomes that value;
        // otherwise the raw string is wrapped so it stays structured.
        let payload = match payload {
            JsonValue::String(s) => match serde_json::from_str::<JsonValue>(&s) {
                Ok(parsed) => parsed,
                Err(_) => json!({"data": s}),
            },
            other => other,
        };

        if Self::is_empty_payload(&payload) {
            Ok(Self::default_output())
        } else {
            Ok(payload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(node: Node) -> JsonValue {
        let mut ctx = ExecutionContext::new("wf");
        ManualTriggerExecutor
            .execute(&node, ResolvedInput::None, &mut ctx)
            .await
            .expect("trigger never fails")
    }

    #[tokio::test]
    async fn string_payload_parses_as_json() {
        let node = Node::new("t", "manual_trigger").with_config("testPayload", json!("{\"x\": 1}"));
        assert_eq!(run(node).await, json!({"x": 1}));
    }

    #[tokio::test]
    async fn unparsable_string_payload_is_wrapped() {
        let node = Node::new("t", "manual_trigger").with_config("testPayload", json!("hello"));
        assert_eq!(run(node).await, json!({"data": "hello"}));
    }

    #[tokio::test]
    async fn object_payload_passes_through() {
        let node =
            Node::new("t", "manual_trigger").with_config("testPayload", json!({"k": "v"}));
        assert_eq!(run(node).await, json!({"k": "v"}));
    }

    #[tokio::test]
    async fn missing_payload_yields_default() {
        let output = run(Node::new("t", "manual_trigger")).await;
        assert_eq!(output["triggered"], json!(true));
        assert!(output["timestamp"].is_string());
    }

    #[tokio::test]
    async fn empty_payload_yields_default() {
        for empty in [json!(null), json!(""), json!({})] {
            let node = Node::new("t", "manual_trigger").with_config("testPayload", empty);
            let output = run(node).await;
            assert_eq!(output["triggered"], json!(true));
        }
    }

    #[tokio::test]
    async fn trigger_logs_activation() {
        let node = Node::new("t", "manual_trigger");
        let mut ctx = ExecutionContext::new("wf");
        ManualTriggerExecutor
            .execute(&node, ResolvedInput::None, &mut ctx)
            .await
            .expect("trigger never fails");

        let (_, log, _) = ctx.into_parts();
        assert!(log.iter().any(|e| e.message.contains("Manual trigger")));
    }
}
