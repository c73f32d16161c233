use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use super::base::{LineStream, Provider};
use super::configs::OpenAiProviderConfig;
use super::utils::{chat_payload, openai_response_text, split_lines, upstream_error_message};
use crate::errors::{RelayError, RelayResult};

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    // No request timeout: a streamed reply stays open as long as the upstream keeps writing
    pub fn new(config: OpenAiProviderConfig) -> RelayResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| RelayError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> RelayResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RelayError::Configuration("OpenAI API key not configured".to_string()))
    }

    async fn post(&self, payload: Value) -> RelayResult<Response> {
        // Checked before anything touches the network
        let api_key = self.api_key()?;
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::Connection(format!("Failed to connect to upstream: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = upstream_error_message(&body);
        Err(RelayError::Upstream {
            status: status.as_u16(),
            message: if message.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                message
            },
        })
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> RelayResult<String> {
        let response = self.post(chat_payload(&self.config.model, prompt, false)).await?;
        let status = response.status().as_u16();

        let body: Value = response
            .json()
            .await
            .map_err(|e| RelayError::Connection(format!("Failed to read upstream response: {}", e)))?;

        openai_response_text(&body).ok_or_else(|| RelayError::Upstream {
            status,
            message: "Response did not contain a message".to_string(),
        })
    }

    async fn stream(&self, prompt: &str) -> RelayResult<LineStream> {
        debug!(model = %self.config.model, "opening streaming completion");
        let response = self.post(chat_payload(&self.config.model, prompt, true)).await?;
        Ok(split_lines(response.bytes_stream()))
    }
}
