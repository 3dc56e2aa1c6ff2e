//! Metered cloud execution strategy (Anthropic Messages API).
//!
//! Cost is computed from the token counts the provider reports, which makes
//! it authoritative over the pre-routing estimate. There is no fallback
//! past cloud: errors propagate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{map_send_error, Backend, ExecutionResult};
use crate::error::ExecutionError;
use crate::router::Tier;

const API_BASE: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MODEL_VERSION: &str = "claude-sonnet-4-20250514";
const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Executes prompts against the Anthropic Messages API.
pub struct CloudBackend {
    client: Client,
    base_url: String,
    api_key: SecretString,
    cost_per_token: Decimal,
    timeout: Duration,
}

impl CloudBackend {
    pub fn new(api_key: SecretString, cost_per_token: Decimal, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: API_BASE.to_string(),
            api_key,
            cost_per_token,
            timeout,
        }
    }

    /// Point the backend at a different API base (integration tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[async_trait]
impl Backend for CloudBackend {
    async fn execute(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<ExecutionResult, ExecutionError> {
        let endpoint = format!("{}/v1/messages", self.base_url);
        let started = Instant::now();

        let response = self
            .client
            .post(&endpoint)
            .timeout(self.timeout)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&MessagesRequest {
                model: MODEL_VERSION,
                max_tokens: MAX_OUTPUT_TOKENS,
                messages: vec![ApiMessage {
                    role: "user",
                    content: prompt,
                }],
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

        let parsed: MessagesResponse =
            response
                .json()
                .await
                .map_err(|e| ExecutionError::InvalidResponse {
                    backend: model.to_string(),
                    reason: e.to_string(),
                })?;

        let total_tokens = parsed.usage.input_tokens + parsed.usage.output_tokens;
        let cost = Decimal::from(total_tokens) * self.cost_per_token;
        let text = parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .unwrap_or_default();

        tracing::debug!(
            model,
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            %cost,
            "cloud execution complete"
        );

        let mut result =
            ExecutionResult::new(model, Tier::Cloud, text, cost, started.elapsed());
        result.input_tokens = Some(parsed.usage.input_tokens);
        result.output_tokens = Some(parsed.usage.output_tokens);
        Ok(result)
    }
}
