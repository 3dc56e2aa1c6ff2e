//! Local (Ollama-compatible) execution strategy.
//!
//! Local inference is already the cheapest tier, so there is no fallback
//! below it: failures propagate to the caller.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{map_send_error, Backend, ExecutionResult};
use crate::error::ExecutionError;
use crate::router::Tier;

/// Map router model names to the tags the serving runtime knows.
fn runtime_tag(model: &str) -> &str {
    match model {
        "phi2" => "phi",
        other => other,
    }
}

/// Executes prompts against a local Ollama-compatible server.
pub struct LocalBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl LocalBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    /// Total wall time reported by the runtime, nanoseconds.
    #[serde(default)]
    total_duration: u64,
}

#[async_trait]
impl Backend for LocalBackend {
    async fn execute(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<ExecutionResult, ExecutionError> {
        let endpoint = format!("{}/api/generate", self.base_url);
        let started = Instant::now();

        let response = self
            .client
            .post(&endpoint)
            .timeout(self.timeout)
            .json(&GenerateRequest {
                model: runtime_tag(model),
                prompt,
                stream: false,
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

        tracing::debug!(model, latency = ?started.elapsed(), "local execution complete");

        let mut result = ExecutionResult::new(
            model,
            Tier::Local,
            parsed.response,
            Decimal::ZERO,
            started.elapsed(),
        );
        result.total_duration = Some(parsed.total_duration);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phi2_maps_to_runtime_phi_tag() {
        assert_eq!(runtime_tag("phi2"), "phi");
        assert_eq!(runtime_tag("tinyllama"), "tinyllama");
    }
}
