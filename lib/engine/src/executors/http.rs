//! HTTP request executor.
//!
//! Performs a real HTTP call with configurable method, headers, body, and
//! auth. The response status is data, not a verdict: a non-2xx response is
//! forwarded to downstream nodes rather than failing the node. Only
//! transport-level problems (connect failure, timeout) fail.

use crate::context::ExecutionContext;
use crate::error::NodeError;
use crate::executors::NodeExecutor;
use crate::execution::LogLevel;
use crate::node::Node;
use crate::resolver::ResolvedInput;
use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value as JsonValue, json};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes `http_request` nodes.
pub struct HttpRequestExecutor {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpRequestExecutor {
    /// Creates an executor with the default 30s request timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates an executor with a custom request timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn method(node: &Node) -> Result<Method, NodeError> {
        let raw = node.config_str("method").unwrap_or("GET");
        Method::from_bytes(raw.to_uppercase().as_bytes()).map_err(|_| NodeError::InvalidConfig {
            field: "method".to_string(),
            reason: format!("'{raw}' is not an HTTP method"),
        })
    }

    fn headers(node: &Node) -> Result<HeaderMap, NodeError> {
        let mut headers = HeaderMap::new();
        let Some(configured) = node.config_value("headers").and_then(JsonValue::as_object) else {
            return Ok(headers);
        };

        for (key, value) in configured {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                NodeError::InvalidConfig {
                    field: "headers".to_string(),
                    reason: format!("'{key}' is not a valid header name"),
                }
            })?;
            let rendered = match value {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            let value = HeaderValue::from_str(&rendered).map_err(|_| NodeError::InvalidConfig {
                field: "headers".to_string(),
                reason: format!("value for '{key}' is not a valid header value"),
            })?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    fn apply_auth(
        node: &Node,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, NodeError> {
        let auth_type = node.config_str("authType").unwrap_or("none");
        match auth_type {
            "none" => Ok(request),
            "basic" => {
                let mut missing = Vec::new();
                let user = node.config_non_empty_str("authUser");
                let password = node.config_str("authPassword");
                if user.is_none() {
                    missing.push("authUser".to_string());
                }
                if password.is_none() {
                    missing.push("authPassword".to_string());
                }
                if !missing.is_empty() {
                    return Err(NodeError::MissingConfig { fields: missing });
                }
                Ok(request.basic_auth(user.unwrap_or_default(), password))
            }
            "bearer" => match node.config_non_empty_str("authToken") {
                Some(token) => Ok(request.bearer_auth(token)),
                None => Err(NodeError::missing_field("authToken")),
            },
            "header" => {
                let mut missing = Vec::new();
                let name = node.config_non_empty_str("authHeaderName");
                let value = node.config_str("authHeaderValue");
                if name.is_none() {
                    missing.push("authHeaderName".to_string());
                }
                if value.is_none() {
                    missing.push("authHeaderValue".to_string());
                }
                if !missing.is_empty() {
                    return Err(NodeError::MissingConfig { fields: missing });
                }
                Ok(request.header(name.unwrap_or_default(), value.unwrap_or_default()))
            }
            other => Err(NodeError::InvalidConfig {
                field: "authType".to_string(),
                reason: format!("unsupported auth type '{other}'"),
            }),
        }
    }

    fn apply_body(
        node: &Node,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, NodeError> {
        let Some(body) = node.config_value("body") else {
            return Ok(request);
        };

        if node.config_str("bodyFormat").unwrap_or("") == "json" {
            // A string body in json format must itself be valid JSON.
            let value = match body {
                JsonValue::String(s) => {
                    serde_json::from_str::<JsonValue>(s).map_err(|e| NodeError::InvalidConfig {
                        field: "body".to_string(),
                        reason: format!("bodyFormat is json but body does not parse: {e}"),
                    })?
                }
                other => other.clone(),
            };
            Ok(request.json(&value))
        } else {
            let rendered = match body {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            Ok(request.body(rendered))
        }
    }
}

impl Default for HttpRequestExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeExecutor for HttpRequestExecutor {
    async fn execute(
        &self,
        node: &Node,
        _input: ResolvedInput,
        context: &mut ExecutionContext,
    ) -> Result<JsonValue, NodeError> {
        let url = node
            .config_non_empty_str("url")
            .ok_or_else(|| NodeError::missing_field("url"))?
            .to_string();
        let method = Self::method(node)?;

        context.log(
            &node.id,
            format!("Executing HTTP {method} {url}"),
            LogLevel::Info,
        );

        let mut request = self
            .client
            .request(method, &url)
            .headers(Self::headers(node)?)
            .timeout(self.timeout);
        request = Self::apply_auth(node, request)?;
        request = Self::apply_body(node, request)?;

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                NodeError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else {
                NodeError::External {
                    reason: format!("request to {url} failed: {e}"),
                }
            }
        })?;

        let status = response.status().as_u16();
        let mut headers = Map::new();
        for (name, value) in response.headers() {
            headers.insert(
                name.to_string(),
                JsonValue::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            );
        }

        let text = response.text().await.map_err(|e| NodeError::External {
            reason: format!("failed to read response body: {e}"),
        })?;
        let body = serde_json::from_str::<JsonValue>(&text)
            .unwrap_or(JsonValue::String(text));

        Ok(json!({
            "statusCode": status,
            "headers": headers,
            "body": body,
        }))
    }
}
