//! Router configuration.
//!
//! Loaded once at startup with env var > default priority and passed
//! explicitly to the orchestrator. Nothing here is mutated after
//! construction; the one runtime-refreshed value (ternary availability)
//! lives on the router itself.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default Ollama-compatible local inference endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default ternary (BitNet) serving endpoint.
pub const DEFAULT_TERNARY_URL: &str = "http://localhost:8003";

/// Process-wide router configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Route simple/medium requests to local models when possible.
    pub use_local: bool,
    /// Tuning knob carried in process state for custom selection policies.
    /// The built-in tier policies use fixed boundaries.
    pub complexity_threshold: f64,
    /// Probe for a ternary runtime at startup.
    pub use_ternary: bool,
    /// Base URL of the local inference server.
    pub ollama_url: String,
    /// Base URL of the ternary serving endpoint.
    pub ternary_url: String,
    /// Cloud API key. Cloud routing is disabled when absent.
    pub anthropic_api_key: Option<SecretString>,
    /// Override for the cloud API base URL (proxies, test harnesses).
    pub anthropic_base_url: Option<String>,
    /// Per-call timeout for backend execution.
    pub request_timeout: Duration,
    /// Timeout for the ternary liveness probe.
    pub probe_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            use_local: true,
            complexity_threshold: 0.5,
            use_ternary: true,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ternary_url: DEFAULT_TERNARY_URL.to_string(),
            anthropic_api_key: None,
            anthropic_base_url: None,
            request_timeout: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(2),
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            use_local: bool_env("USE_LOCAL_FOR_SIMPLE", true)?,
            complexity_threshold: f64_env("COMPLEXITY_THRESHOLD", 0.5)?,
            use_ternary: bool_env("USE_TERNARY", true)?,
            ollama_url: optional_env("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.into()),
            ternary_url: optional_env("TERNARY_URL").unwrap_or_else(|| DEFAULT_TERNARY_URL.into()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY").map(SecretString::from),
            anthropic_base_url: optional_env("ANTHROPIC_BASE_URL"),
            request_timeout: Duration::from_secs(u64_env("REQUEST_TIMEOUT_SECS", 60)?),
            probe_timeout: Duration::from_secs(u64_env("PROBE_TIMEOUT_SECS", 2)?),
        })
    }
}

/// Read an optional env var, treating empty values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    match optional_env(key) {
        None => Ok(default),
        Some(v) => match v.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected boolean, got '{v}'"),
            }),
        },
    }
}

fn f64_env(key: &str, default: f64) -> Result<f64, ConfigError> {
    match optional_env(key) {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected float, got '{v}'"),
        }),
    }
}

fn u64_env(key: &str, default: u64) -> Result<u64, ConfigError> {
    match optional_env(key) {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected integer, got '{v}'"),
        }),
    }
}
