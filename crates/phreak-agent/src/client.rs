//! Anthropic Messages API client
//!
//! Every request is a single stateless user message; the browse prompt carries all the
//! context the planner gets.

use crate::auth;
use crate::planner::Planner;
use crate::types::{AnthropicMessage, AnthropicRequest, AnthropicResponse, PlanResult};
use async_trait::async_trait;
use chrono::Utc;
use phreak_core::{PhreakError, PlannerSettings, Result};
use std::time::Duration;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// Rate limit retry configuration
const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF_SECS: u64 = 5;
const MAX_BACKOFF_SECS: u64 = 120;

/// Completion client for the planner
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: usize,
    api_key_env: String,
}

impl CompletionClient {
    pub fn new(settings: &PlannerSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: ANTHROPIC_API_URL.to_string(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            api_key_env: settings.api_key_env.clone(),
        }
    }

    /// Send requests somewhere other than the public API (proxies, gateways)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set max tokens for responses
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Ask the model to complete `prompt`
    pub async fn complete(&self, prompt: &str) -> Result<PlanResult> {
        let api_key = auth::get_api_key(&self.api_key_env)?;

        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        // Retry loop with exponential backoff for rate limits and server errors
        let mut retries = 0;
        let mut backoff_secs = INITIAL_BACKOFF_SECS;

        loop {
            tracing::debug!("Sending planner request (attempt {})", retries + 1);

            let response = self
                .http
                .post(&self.endpoint)
                .header("x-api-key", &api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| PhreakError::Planner(format!("Failed to send request: {}", e)))?;

            let status = response.status();

            if status.as_u16() == 429 {
                retries += 1;

                if retries > MAX_RETRIES {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown".to_string());
                    return Err(PhreakError::PlannerLimit(format!(
                        "Rate limit exceeded after {} retries. Last error: {}",
                        MAX_RETRIES, error_text
                    )));
                }

                // Parse retry-after header if present, otherwise use exponential backoff
                let wait_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(backoff_secs);

                tracing::warn!(
                    "Rate limited (429). Waiting {} seconds before retry {}/{}",
                    wait_secs,
                    retries,
                    MAX_RETRIES
                );

                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                backoff_secs = next_backoff(backoff_secs);
                continue;
            }

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown".to_string());

                if status.is_server_error() && retries < MAX_RETRIES {
                    retries += 1;
                    tracing::warn!(
                        "Server error ({}). Waiting {} seconds before retry {}/{}",
                        status,
                        backoff_secs,
                        retries,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = next_backoff(backoff_secs);
                    continue;
                }

                if status.as_u16() == 401 || status.as_u16() == 403 {
                    return Err(PhreakError::Auth(format!(
                        "Anthropic API rejected the key in {} ({}): {}",
                        self.api_key_env, status, error_text
                    )));
                }

                return Err(PhreakError::Planner(format!(
                    "Anthropic API error {}: {}",
                    status, error_text
                )));
            }

            let anthropic_response: AnthropicResponse = response
                .json()
                .await
                .map_err(|e| PhreakError::Planner(format!("Failed to parse response: {}", e)))?;

            let output = anthropic_response.text();
            let usage = anthropic_response.usage;

            if let Some(ref usage_info) = usage {
                tracing::info!(
                    "Planner replied ({} chars, {} input tokens, {} output tokens)",
                    output.len(),
                    usage_info.input_tokens,
                    usage_info.output_tokens
                );
            } else {
                tracing::info!("Planner replied ({} chars)", output.len());
            }

            return Ok(PlanResult {
                output,
                timestamp: Utc::now(),
                usage,
            });
        }
    }
}

fn next_backoff(current: u64) -> u64 {
    (current * 2).min(MAX_BACKOFF_SECS)
}

#[async_trait]
impl Planner for CompletionClient {
    async fn next_command(&self, prompt: &str) -> Result<String> {
        Ok(self.complete(prompt).await?.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_complete_without_key_fails_before_sending() {
        std::env::remove_var("PHREAK_TEST_NO_KEY");
        let settings = PlannerSettings {
            api_key_env: "PHREAK_TEST_NO_KEY".to_string(),
            ..PlannerSettings::default()
        };

        // An unroutable endpoint: reaching the network would be a Planner error, not Auth
        let client = CompletionClient::new(&settings).with_endpoint("http://127.0.0.1:9/");
        let err = client.next_command("prompt").await.unwrap_err();
        assert!(matches!(err, PhreakError::Auth(_)));
    }

    #[test]
    fn test_client_builder() {
        let client = CompletionClient::new(&PlannerSettings::default()).with_max_tokens(64);
        assert_eq!(client.max_tokens, 64);
        assert_eq!(client.model, "claude-sonnet-4-5-20250929");
        assert_eq!(client.endpoint, ANTHROPIC_API_URL);
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(next_backoff(5), 10);
        assert_eq!(next_backoff(100), MAX_BACKOFF_SECS);
    }
}
