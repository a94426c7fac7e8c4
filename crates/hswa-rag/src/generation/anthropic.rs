//! Anthropic messages API client
//!
//! Sends one prompt per request and returns the raw text response. There is
//! deliberately no retry loop here: timeouts, auth failures, and rate limits
//! are mapped to distinct error kinds and surfaced to the caller, which owns
//! any retry policy.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, GenerationErrorKind, Result};
use crate::generation::LlmProvider;

/// Client for the Anthropic messages API
pub struct AnthropicClient {
    client: Client,
    config: LlmConfig,
    api_key: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    /// Create a client with the caller-supplied timeout applied to every call.
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config(
                "ANTHROPIC_API_KEY is not set; the generation service requires it",
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    fn classify(status: StatusCode) -> GenerationErrorKind {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationErrorKind::Auth,
            StatusCode::TOO_MANY_REQUESTS => GenerationErrorKind::RateLimited,
            _ => GenerationErrorKind::Service,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.config.base_url);
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "generation request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() {
                    GenerationErrorKind::Timeout
                } else {
                    GenerationErrorKind::Service
                };
                Error::generation(kind, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(
                Self::classify(status),
                format!("HTTP {status}: {body}"),
            ));
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| {
            Error::generation(
                GenerationErrorKind::Service,
                format!("unparseable response: {e}"),
            )
        })?;

        let text: String = parsed
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();

        if text.is_empty() {
            return Err(Error::generation(
                GenerationErrorKind::Service,
                "response contained no text blocks",
            ));
        }

        Ok(text)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
