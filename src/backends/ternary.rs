//! Ternary (1.58-bit quantized) execution strategy.
//!
//! Ternary runtimes are opportunistic: liveness is established by a
//! bounded-timeout probe, and any failure during execution is transparently
//! downgraded to a cloud execution. The caller only ever sees the ternary
//! error when there is no cloud backend to absorb it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{map_send_error, Backend, CloudBackend, ExecutionResult};
use crate::error::ExecutionError;
use crate::router::selector::CLAUDE_SONNET;
use crate::router::Tier;

const MAX_TOKENS: u32 = 512;
const QUANTIZATION: &str = "1.58-bit";

/// Probe the ternary runtime's health endpoint.
///
/// Never errors and never blocks past `timeout`: network failure, a
/// non-success status, or an explicit `ternary: false` all resolve to
/// unavailable.
pub async fn probe(base_url: &str, timeout: Duration) -> bool {
    let client = Client::new();
    let endpoint = format!("{base_url}/health");

    let response = match client.get(&endpoint).timeout(timeout).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(error = %e, "ternary probe failed");
            return false;
        }
    };
    if !response.status().is_success() {
        return false;
    }
    #[derive(Deserialize)]
    struct Health {
        #[serde(default)]
        ternary: bool,
    }
    match response.json::<Health>().await {
        Ok(h) => h.ternary,
        Err(_) => false,
    }
}

/// Executes prompts against a ternary model server, with cloud fallback.
pub struct TernaryBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
    fallback: Option<Arc<CloudBackend>>,
}

impl TernaryBackend {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        fallback: Option<Arc<CloudBackend>>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout,
            fallback,
        }
    }

    async fn attempt(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<ExecutionResult, ExecutionError> {
        let endpoint = format!("{}/generate", self.base_url);
        let started = Instant::now();

        let response = self
            .client
            .post(&endpoint)
            .timeout(self.timeout)
            .json(&GenerateRequest {
                model,
                prompt,
                max_tokens: MAX_TOKENS,
            })
            .send()
            .await
            .map_err(|e| map_send_error(model, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutionError::RequestFailed {
                backend: model.to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let parsed: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| ExecutionError::InvalidResponse {
                    backend: model.to_string(),
                    reason: e.to_string(),
                })?;

        let mut result = ExecutionResult::new(
            model,
            Tier::Ternary,
            parsed.text,
            Decimal::ZERO,
            started.elapsed(),
        );
        result.inference_time_ms = Some(parsed.inference_time_ms);
        result.tokens_per_second = Some(parsed.tokens_per_second);
        result.quantization = Some(QUANTIZATION.to_string());
        Ok(result)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    inference_time_ms: u64,
    #[serde(default)]
    tokens_per_second: f64,
}

#[async_trait]
impl Backend for TernaryBackend {
    async fn execute(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<ExecutionResult, ExecutionError> {
        match self.attempt(model, prompt).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!(model, error = %e, "ternary request failed, falling back to cloud");
                match &self.fallback {
                    Some(cloud) => cloud.execute(CLAUDE_SONNET, prompt).await,
                    None => Err(ExecutionError::CloudNotConfigured),
                }
            }
        }
    }
}
