//! Scripted transform executor.
//!
//! Runs user-supplied code in an isolated subprocess. The resolved upstream
//! input is passed as JSON in the `INPUT` environment variable; the default
//! Node.js interpreter additionally gets a prelude binding it to an `input`
//! variable. The subprocess is bounded by a hard wall-clock timeout and must
//! print a single JSON value to standard output.

use crate::context::ExecutionContext;
use crate::error::NodeError;
use crate::executors::NodeExecutor;
use crate::execution::LogLevel;
use crate::node::Node;
use crate::resolver::ResolvedInput;
use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Executes `transform_js` nodes.
pub struct ScriptExecutor {
    program: String,
    args: Vec<String>,
    /// Whether to prepend the JavaScript `input` binding prelude. Only set
    /// for the default Node.js interpreter; custom interpreters receive the
    /// code verbatim and read `INPUT` themselves.
    js_prelude: bool,
    timeout: Duration,
}

impl ScriptExecutor {
    /// Creates an executor using the Node.js runtime (`node -e`).
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "node".to_string(),
            args: vec!["-e".to_string()],
            js_prelude: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates an executor using a custom interpreter. The script is passed
    /// verbatim as the final argument, with the input JSON in `INPUT`.
    #[must_use]
    pub fn with_interpreter(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            js_prelude: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the wall-clock timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_script(&self, code: &str) -> String {
        if self.js_prelude {
            format!("const input = JSON.parse(process.env.INPUT ?? \"null\");\n{code}")
        } else {
            code.to_string()
        }
    }
}

impl Default for ScriptExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeExecutor for ScriptExecutor {
    async fn execute(
        &self,
        node: &Node,
        input: ResolvedInput,
        context: &mut ExecutionContext,
    ) -> Result<JsonValue, NodeError> {
        let code = node
            .config_non_empty_str("code")
            .ok_or_else(|| NodeError::missing_field("code"))?;

        context.log(
            &node.id,
            format!("Executing script via {}", self.program),
            LogLevel::Info,
        );

        let input_json =
            serde_json::to_string(&input.into_value_or(json!(null))).unwrap_or_default();

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(self.build_script(code))
            .env("INPUT", input_json)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| NodeError::ScriptFailed {
                reason: format!("runtime '{}' unavailable: {e}", self.program),
            })?;

        // kill_on_drop reaps the child when the timeout drops the future.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| NodeError::Timeout {
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| NodeError::ScriptFailed {
                reason: format!("failed to collect script output: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NodeError::ScriptFailed {
                reason: format!(
                    "script exited with {}: {}",
                    output.status,
                    stderr.trim().chars().take(500).collect::<String>()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(stdout.trim()).map_err(|e| NodeError::ScriptFailed {
            reason: format!("script output is not valid JSON: {e}"),
        })
    }
}
