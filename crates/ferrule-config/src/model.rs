// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Ferrule invocation layer.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::HashMap;

use ferrule_core::ModelInfo;
use serde::{Deserialize, Serialize};

/// Top-level Ferrule configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FerruleConfig {
    /// Model selection and sampling settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// OpenAI / Azure OpenAI endpoint settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Retry and backoff tuning.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Budget ceiling.
    #[serde(default)]
    pub cost: CostConfig,

    /// Plugin allow/deny lists.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Extra entries for the model registry, added to the built-in catalog.
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// Model selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Model used when a call does not name one.
    #[serde(default = "default_fast_llm")]
    pub fast_llm: String,

    /// Model for harder reasoning steps.
    #[serde(default = "default_smart_llm")]
    pub smart_llm: String,

    /// Model used for embeddings.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature used when a call does not set one.
    #[serde(default)]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            fast_llm: default_fast_llm(),
            smart_llm: default_smart_llm(),
            embedding_model: default_embedding_model(),
            temperature: 0.0,
        }
    }
}

fn default_fast_llm() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_smart_llm() -> String {
    "gpt-4".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` requires the `FERRULE_OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Optional organization header.
    #[serde(default)]
    pub organization: Option<String>,

    /// Route requests to Azure OpenAI deployments instead of model names.
    #[serde(default)]
    pub use_azure: bool,

    /// Azure `api-version` query parameter.
    #[serde(default = "default_azure_api_version")]
    pub azure_api_version: String,

    /// Model name to Azure deployment id.
    #[serde(default)]
    pub azure_model_map: HashMap<String, String>,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            organization: None,
            use_azure: false,
            azure_api_version: default_azure_api_version(),
            azure_model_map: HashMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OpenAiConfig {
    /// Azure deployment id configured for `model`, if any.
    pub fn deployment_for(&self, model: &str) -> Option<&str> {
        self.azure_model_map.get(model).map(String::as_str)
    }
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_azure_api_version() -> String {
    "2023-03-15-preview".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

/// Retry policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    #[serde(default = "default_num_retries")]
    pub num_retries: u32,

    /// Base of the exponential backoff, in seconds.
    #[serde(default = "default_backoff_base")]
    pub backoff_base: f64,

    /// Emit the one-time paid-account advisory on rate limiting.
    #[serde(default = "default_warn_user")]
    pub warn_user: bool,

    /// Give up retrying once a call has run this long. `None` = no deadline.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            num_retries: default_num_retries(),
            backoff_base: default_backoff_base(),
            warn_user: default_warn_user(),
            deadline_secs: None,
        }
    }
}

fn default_num_retries() -> u32 {
    10
}

fn default_backoff_base() -> f64 {
    2.0
}

fn default_warn_user() -> bool {
    true
}

/// Cost tracking configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Total spend ceiling in USD for the run (None = unbounded).
    #[serde(default)]
    pub total_budget_usd: Option<f64>,
}

/// Plugin selection configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// When non-empty, only these plugins are loaded.
    #[serde(default)]
    pub allowlist: Vec<String>,

    /// Plugins that are never loaded.
    #[serde(default)]
    pub denylist: Vec<String>,
}

impl PluginsConfig {
    /// Whether the plugin named `name` may join the chain.
    pub fn permits(&self, name: &str) -> bool {
        if self.denylist.iter().any(|n| n == name) {
            return false;
        }
        self.allowlist.is_empty() || self.allowlist.iter().any(|n| n == name)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
