//! Workflow node types.
//!
//! Nodes are the building blocks of a workflow document. Each node has:
//! - An author-assigned id, unique within the workflow
//! - A type tag selecting an executor variant
//! - A free-form configuration map specific to its type
//! - Settings controlling how the orchestrator treats it

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Per-node execution settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSettings {
    /// Disabled nodes are skipped: the engine records a skip marker and
    /// never invokes the executor.
    #[serde(default)]
    pub disabled: bool,
    /// When true, a failure of this node is recorded but does not halt
    /// the run.
    #[serde(default, rename = "continueOnFail")]
    pub continue_on_fail: bool,
}

/// A node in a workflow document.
///
/// Immutable during a single execution; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node within the workflow.
    pub id: String,
    /// Type tag selecting the executor variant (e.g. `http_request`).
    #[serde(rename = "type")]
    pub node_type: String,
    /// Type-specific configuration parameters.
    #[serde(default, alias = "parameters")]
    pub config: Map<String, JsonValue>,
    /// Execution settings.
    #[serde(default)]
    pub settings: NodeSettings,
}

impl Node {
    /// Creates a new node with empty configuration and default settings.
    #[must_use]
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            config: Map::new(),
            settings: NodeSettings::default(),
        }
    }

    /// Adds a configuration parameter.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Marks the node as disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.settings.disabled = true;
        self
    }

    /// Marks the node as continue-on-fail.
    #[must_use]
    pub fn continue_on_fail(mut self) -> Self {
        self.settings.continue_on_fail = true;
        self
    }

    /// Returns a configuration value by key, if present.
    #[must_use]
    pub fn config_value(&self, key: &str) -> Option<&JsonValue> {
        self.config.get(key)
    }

    /// Returns a configuration value as a string slice.
    ///
    /// `None` when the key is absent or the value is not a string.
    #[must_use]
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(JsonValue::as_str)
    }

    /// Returns a non-empty string configuration value.
    ///
    /// Empty strings are treated the same as absent keys, so required-field
    /// checks reject both uniformly.
    #[must_use]
    pub fn config_non_empty_str(&self, key: &str) -> Option<&str> {
        self.config_str(key).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_builder() {
        let node = Node::new("n1", "http_request")
            .with_config("url", json!("https://example.test"))
            .continue_on_fail();

        assert_eq!(node.id, "n1");
        assert_eq!(node.node_type, "http_request");
        assert_eq!(node.config_str("url"), Some("https://example.test"));
        assert!(node.settings.continue_on_fail);
        assert!(!node.settings.disabled);
    }

    #[test]
    fn settings_default_to_enabled() {
        let settings = NodeSettings::default();
        assert!(!settings.disabled);
        assert!(!settings.continue_on_fail);
    }

    #[test]
    fn node_deserializes_wire_shape() {
        let node: Node = serde_json::from_str(
            r#"{
                "id": "trigger-1",
                "type": "manual_trigger",
                "config": {"testPayload": "{\"x\": 1}"},
                "settings": {"disabled": false, "continueOnFail": true}
            }"#,
        )
        .expect("deserialize");

        assert_eq!(node.id, "trigger-1");
        assert_eq!(node.node_type, "manual_trigger");
        assert!(node.settings.continue_on_fail);
    }

    #[test]
    fn node_accepts_parameters_alias() {
        let node: Node = serde_json::from_str(
            r#"{"id": "n", "type": "if", "parameters": {"combineOperation": "OR"}}"#,
        )
        .expect("deserialize");

        assert_eq!(node.config_str("combineOperation"), Some("OR"));
    }

    #[test]
    fn config_non_empty_str_rejects_empty() {
        let node = Node::new("n", "http_request").with_config("url", json!(""));
        assert_eq!(node.config_non_empty_str("url"), None);
        assert_eq!(node.config_str("url"), Some(""));
    }
}
