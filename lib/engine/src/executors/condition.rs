//! Conditional (`if`) executor.
//!
//! Evaluates a list of conditions against fields extracted from the resolved
//! input and combines them with AND/OR. The scheduler has no notion of
//! taking a branch: every node in the graph still executes, and this output
//! is informational data for downstream consumers.

use crate::context::ExecutionContext;
use crate::error::NodeError;
use crate::executors::NodeExecutor;
use crate::execution::LogLevel;
use crate::node::Node;
use crate::resolver::ResolvedInput;
use async_trait::async_trait;
use regex::Regex;
use serde_json::{Value as JsonValue, json};

/// Executes `if` nodes.
pub struct IfExecutor;

impl IfExecutor {
    /// Extracts a field from the input by dot-separated path. Array segments
    /// may be numeric indices. Missing paths yield `Null`.
    fn extract<'a>(input: &'a JsonValue, path: &str) -> &'a JsonValue {
        let mut current = input;
        for segment in path.split('.') {
            current = match current {
                JsonValue::Object(map) => map.get(segment).unwrap_or(&JsonValue::Null),
                JsonValue::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i))
                    .unwrap_or(&JsonValue::Null),
                _ => &JsonValue::Null,
            };
        }
        current
    }

    /// Coerces a JSON value to f64 for ordered comparisons.
    fn as_number(value: &JsonValue) -> Option<f64> {
        match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn render(value: &JsonValue) -> String {
        match value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Loose equality: exact JSON equality, or numeric equality when both
    /// sides coerce to numbers.
    fn loosely_equal(left: &JsonValue, right: &JsonValue) -> bool {
        if left == right {
            return true;
        }
        match (Self::as_number(left), Self::as_number(right)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn numeric_pair(
        field: &str,
        left: &JsonValue,
        right: &JsonValue,
    ) -> Result<(f64, f64), NodeError> {
        match (Self::as_number(left), Self::as_number(right)) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(NodeError::InvalidConfig {
                field: "conditions".to_string(),
                reason: format!(
                    "numeric comparison on '{field}' requires numbers, got {left} and {right}"
                ),
            }),
        }
    }

    fn evaluate(condition: &JsonValue, input: &JsonValue) -> Result<bool, NodeError> {
        let field = condition
            .get("field")
            .and_then(JsonValue::as_str)
            .unwrap_or_default();
        let operation = condition
            .get("operation")
            .and_then(JsonValue::as_str)
            .unwrap_or("equals");
        let expected = condition.get("value").cloned().unwrap_or(JsonValue::Null);
        let actual = Self::extract(input, field);

        match operation {
            "equals" => Ok(Self::loosely_equal(actual, &expected)),
            "notEquals" => Ok(!Self::loosely_equal(actual, &expected)),
            "contains" => Ok(match actual {
                JsonValue::Array(items) => items.contains(&expected),
                JsonValue::String(s) => s.contains(&Self::render(&expected)),
                _ => false,
            }),
            "greaterThan" => {
                let (a, b) = Self::numeric_pair(field, actual, &expected)?;
                Ok(a > b)
            }
            "lessThan" => {
                let (a, b) = Self::numeric_pair(field, actual, &expected)?;
                Ok(a < b)
            }
            "regex" => {
                let pattern = Self::render(&expected);
                let regex = Regex::new(&pattern).map_err(|e| NodeError::InvalidConfig {
                    field: "conditions".to_string(),
                    reason: format!("invalid regex '{pattern}': {e}"),
                })?;
                Ok(regex.is_match(&Self::render(actual)))
            }
            other => Err(NodeError::InvalidConfig {
                field: "conditions".to_string(),
                reason: format!("unknown operation '{other}'"),
            }),
        }
    }
}

#[async_trait]
impl NodeExecutor for IfExecutor {
    async fn execute(
        &self,
        node: &Node,
        input: ResolvedInput,
        context: &mut ExecutionContext,
    ) -> Result<JsonValue, NodeError> {
        let conditions = node
            .config_value("conditions")
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default();
        let combine = node
            .config_str("combineOperation")
            .unwrap_or("AND")
            .to_uppercase();

        context.log(
            &node.id,
            format!("Evaluating {} condition(s), combine {combine}", conditions.len()),
            LogLevel::Info,
        );

        let input_value = input.into_value_or(JsonValue::Null);

        let mut results = Vec::with_capacity(conditions.len());
        for condition in &conditions {
            results.push(Self::evaluate(condition, &input_value)?);
        }

        // An empty condition list is false under both combinators.
        let met = match combine.as_str() {
            "AND" => !results.is_empty() && results.iter().all(|r| *r),
            "OR" => results.iter().any(|r| *r),
            other => {
                return Err(NodeError::InvalidConfig {
                    field: "combineOperation".to_string(),
                    reason: format!("expected AND or OR, got '{other}'"),
                });
            }
        };

        Ok(json!({
            "condition_met": met,
            "conditions_evaluated": results.len(),
        }))
    }
}
