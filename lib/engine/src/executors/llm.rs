//! LLM call executor.
//!
//! Single-shot inference against a configured provider (OpenAI, Anthropic,
//! or Google), dispatched over plain HTTPS. A `{{input}}` placeholder in the
//! prompt is substituted with the JSON of the resolved upstream input. The
//! output carries the response text plus token usage.

use crate::context::ExecutionContext;
use crate::error::NodeError;
use crate::executors::NodeExecutor;
use crate::execution::LogLevel;
use crate::node::Node;
use crate::resolver::ResolvedInput;
use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Base URLs for the supported providers. Overridable so tests can point at
/// a local fake.
#[derive(Debug, Clone)]
pub struct LlmEndpoints {
    pub openai: String,
    pub anthropic: String,
    pub google: String,
}

impl Default for LlmEndpoints {
    fn default() -> Self {
        Self {
            openai: "https://api.openai.com".to_string(),
            anthropic: "https://api.anthropic.com".to_string(),
            google: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

/// Executes `llm_call` nodes.
pub struct LlmCallExecutor {
    client: reqwest::Client,
    endpoints: LlmEndpoints,
    timeout: Duration,
}

impl LlmCallExecutor {
    /// Creates an executor targeting the public provider endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoints(LlmEndpoints::default())
    }

    /// Creates an executor with custom provider base URLs.
    #[must_use]
    pub fn with_endpoints(endpoints: LlmEndpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn post(
        &self,
        url: String,
        builder: reqwest::RequestBuilder,
        provider: &str,
    ) -> Result<JsonValue, NodeError> {
        let response = builder
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NodeError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    NodeError::External {
                        reason: format!("{provider} request to {url} failed: {e}"),
                    }
                }
            })?;

        let status = response.status();
        let body: JsonValue = response.json().await.map_err(|e| NodeError::External {
            reason: format!("{provider} returned an unreadable response: {e}"),
        })?;

        if !status.is_success() {
            return Err(NodeError::External {
                reason: format!("{provider} rejected the request ({status}): {body}"),
            });
        }

        Ok(body)
    }

    async fn call_openai(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<(String, JsonValue), NodeError> {
        let url = format!("{}/v1/chat/completions", self.endpoints.openai);
        let payload = json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
        });
        let body = self
            .post(
                url.clone(),
                self.client.post(&url).bearer_auth(api_key).json(&payload),
                "openai",
            )
            .await?;

        let text = body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let usage = json!({
            "prompt_tokens": body["usage"]["prompt_tokens"].as_i64().unwrap_or(0),
            "completion_tokens": body["usage"]["completion_tokens"].as_i64().unwrap_or(0),
            "total_tokens": body["usage"]["total_tokens"].as_i64().unwrap_or(0),
        });
        Ok((text, usage))
    }

    async fn call_anthropic(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<(String, JsonValue), NodeError> {
        let url = format!("{}/v1/messages", self.endpoints.anthropic);
        let payload = json!({
            "model": model,
            "max_tokens": 1024,
            "messages": [{"role": "user", "content": prompt}],
        });
        let body = self
            .post(
                url.clone(),
                self.client
                    .post(&url)
                    .header("x-api-key", api_key)
                    .header("anthropic-version", "2023-06-01")
                    .json(&payload),
                "anthropic",
            )
            .await?;

        let text = body["content"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let input_tokens = body["usage"]["input_tokens"].as_i64().unwrap_or(0);
        let output_tokens = body["usage"]["output_tokens"].as_i64().unwrap_or(0);
        let usage = json!({
            "prompt_tokens": input_tokens,
            "completion_tokens": output_tokens,
            "total_tokens": input_tokens + output_tokens,
        });
        Ok((text, usage))
    }

    async fn call_google(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<(String, JsonValue), NodeError> {
        let url = format!(
            "{}/v1beta/models/{model}:generateContent?key={api_key}",
            self.endpoints.google
        );
        let payload = json!({
            "contents": [{"parts": [{"text": prompt}]}],
        });
        let body = self
            .post(url.clone(), self.client.post(&url).json(&payload), "google")
            .await?;

        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let usage = json!({
            "prompt_tokens": body["usageMetadata"]["promptTokenCount"].as_i64().unwrap_or(0),
            "completion_tokens": body["usageMetadata"]["candidatesTokenCount"].as_i64().unwrap_or(0),
            "total_tokens": body["usageMetadata"]["totalTokenCount"].as_i64().unwrap_or(0),
        });
        Ok((text, usage))
    }

    fn default_model(provider: &str) -> &'static str {
        match provider {
            "anthropic" => "claude-3-5-haiku-latest",
            "google" => "gemini-1.5-flash",
            _ => "gpt-4o-mini",
        }
    }
}

impl Default for LlmCallExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeExecutor for LlmCallExecutor {
    async fn execute(
        &self,
        node: &Node,
        input: ResolvedInput,
        context: &mut ExecutionContext,
    ) -> Result<JsonValue, NodeError> {
        let mut missing = Vec::new();
        if node.config_non_empty_str("prompt").is_none() {
            missing.push("prompt".to_string());
        }
        if node.config_non_empty_str("apiKey").is_none() {
            missing.push("apiKey".to_string());
        }
        if !missing.is_empty() {
            return Err(NodeError::MissingConfig { fields: missing });
        }

        let prompt = node.config_str("prompt").unwrap_or_default().to_string();
        let api_key = node.config_str("apiKey").unwrap_or_default();
        let provider = node.config_str("provider").unwrap_or("openai").to_string();
        let model = node
            .config_non_empty_str("model")
            .unwrap_or_else(|| Self::default_model(&provider))
            .to_string();

        // Substitute the upstream input into the prompt when present.
        let prompt = match input.into_value() {
            Some(value) if prompt.contains("{{input}}") => {
                let rendered = serde_json::to_string(&value).unwrap_or_default();
                prompt.replace("{{input}}", &rendered)
            }
            _ => prompt,
        };

        context.log(
            &node.id,
            format!("Calling LLM provider {provider} (model {model})"),
            LogLevel::Info,
        );

        let (text, usage) = match provider.as_str() {
            "openai" => self.call_openai(api_key, &model, &prompt).await?,
            "anthropic" => self.call_anthropic(api_key, &model, &prompt).await?,
            "google" => self.call_google(api_key, &model, &prompt).await?,
            other => {
                return Err(NodeError::InvalidConfig {
                    field: "provider".to_string(),
                    reason: format!("unsupported provider '{other}'"),
                });
            }
        };

        Ok(json!({
            "provider": provider,
            "model": model,
            "response": text,
            "usage": usage,
        }))
    }
}
