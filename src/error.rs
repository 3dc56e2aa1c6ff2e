//! Error types for the routing engine.

use std::time::Duration;

/// Top-level error type for the router.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Recorder error: {0}")]
    Recorder(#[from] RecorderError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Backend execution errors.
///
/// One attempt per call: executors never retry internally, so every variant
/// maps to a single failed outbound call (or a rejected call that never went
/// out). The ternary backend downgrades its own failures to a cloud
/// execution before the caller sees them.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Backend {backend} request failed: {reason}")]
    RequestFailed { backend: String, reason: String },

    #[error("Backend {backend} timed out after {timeout:?}")]
    Timeout { backend: String, timeout: Duration },

    #[error("Invalid response from {backend}: {reason}")]
    InvalidResponse { backend: String, reason: String },

    #[error("Cloud backend not configured (ANTHROPIC_API_KEY not set)")]
    CloudNotConfigured,

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),
}

/// Outcome recorder errors.
///
/// Recording is diagnostic, not transactional: the orchestrator logs and
/// discards these, so they never reach a caller through `process`.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Recorder unavailable: {0}")]
    Unavailable(String),

    #[error("Recorder write failed: {0}")]
    WriteFailed(String),
}
