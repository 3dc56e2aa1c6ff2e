//! Backend execution strategies.
//!
//! One strategy per tier: local (free, no safety net), ternary (free, falls
//! back to cloud on any failure), cloud (metered, fails loudly). Each
//! invocation is a single outbound call bounded by the configured timeout;
//! executors never retry internally.

pub mod cloud;
pub mod local;
pub mod ternary;

pub use cloud::CloudBackend;
pub use local::LocalBackend;
pub use ternary::TernaryBackend;

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;
use crate::router::Tier;

/// Routing metadata the orchestrator attaches to a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingMetadata {
    pub complexity: f64,
    pub reasoning: String,
    pub estimated_cost: Decimal,
}

/// Normalized output of one backend execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub model: String,
    pub tier: Tier,
    pub response: String,
    /// Authoritative realized cost. May differ from the routing estimate.
    pub cost: Decimal,
    /// Wall-clock duration of the outbound call.
    pub latency: Duration,
    /// Runtime-reported total duration (nanoseconds), local backends only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    /// Server-side inference time (milliseconds), ternary backends only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_per_second: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
    /// Attached by the orchestrator; absent on raw executor output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingMetadata>,
}

impl ExecutionResult {
    /// Build a result with only the fields every backend produces.
    pub fn new(
        model: impl Into<String>,
        tier: Tier,
        response: impl Into<String>,
        cost: Decimal,
        latency: Duration,
    ) -> Self {
        Self {
            model: model.into(),
            tier,
            response: response.into(),
            cost,
            latency,
            total_duration: None,
            inference_time_ms: None,
            tokens_per_second: None,
            quantization: None,
            input_tokens: None,
            output_tokens: None,
            routing: None,
        }
    }
}

/// A backend execution strategy.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute one prompt against one model, with a bounded timeout.
    async fn execute(&self, model: &str, prompt: &str)
        -> Result<ExecutionResult, ExecutionError>;
}

/// Map a reqwest send error to the execution taxonomy.
pub(crate) fn map_send_error(
    backend: &str,
    timeout: Duration,
    err: reqwest::Error,
) -> ExecutionError {
    if err.is_timeout() {
        ExecutionError::Timeout {
            backend: backend.to_string(),
            timeout,
        }
    } else {
        ExecutionError::RequestFailed {
            backend: backend.to_string(),
            reason: err.to_string(),
        }
    }
}
