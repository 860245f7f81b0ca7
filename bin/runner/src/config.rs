//! Centralized runner configuration.
//!
//! Strongly-typed configuration for the CLI runner, loaded via the `config`
//! crate from environment variables. Example:
//!
//! ```sh
//! COPPER_RELAY__HTTP__TIMEOUT_SECONDS=10 copper-relay workflow.json
//! ```

use serde::Deserialize;

/// Runner configuration.
#[derive(Debug, Default, Deserialize)]
pub struct RunnerConfig {
    /// HTTP request executor settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Script executor settings.
    #[serde(default)]
    pub script: ScriptConfig,
}

/// HTTP executor settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_http_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Script executor settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    /// Hard wall-clock timeout for script subprocesses, in seconds.
    #[serde(default = "default_script_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Override interpreter program (defaults to Node.js).
    #[serde(default)]
    pub interpreter: Option<String>,

    /// Arguments passed to the override interpreter before the script.
    #[serde(default = "default_interpreter_args")]
    pub interpreter_args: Vec<String>,
}

fn default_http_timeout_seconds() -> u64 {
    30
}

fn default_script_timeout_seconds() -> u64 {
    10
}

fn default_interpreter_args() -> Vec<String> {
    vec!["-e".to_string()]
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout_seconds(),
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_script_timeout_seconds(),
            interpreter: None,
            interpreter_args: default_interpreter_args(),
        }
    }
}

impl RunnerConfig {
    /// Loads configuration from `COPPER_RELAY__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a provided value fails to parse.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("COPPER_RELAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
