//! OpenAI-compatible provider implementation.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, Together AI, Fireworks AI,
//! and any endpoint exposing a streaming `/chat/completions`.
//!
//! The assembled prompt is sent as a single user message; content deltas
//! from `choices[0].delta.content` become the stream's fragments.

use async_trait::async_trait;
use docchat_core::error::ProviderError;
use docchat_core::provider::{ChunkReceiver, GenerationRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::upstream::{self, Parsed};

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout.unwrap_or(Duration::from_secs(10)))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn request_body(request: &GenerationRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": [ApiMessage {
                role: "user".into(),
                content: request.prompt.clone(),
            }],
            "temperature": request.temperature,
            "stream": true,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    /// Interpret one SSE `data:` payload.
    fn parse_event(data: &str) -> Parsed {
        let data = data.trim();

        // "[DONE]" signals end of stream
        if data == "[DONE]" {
            return Parsed::Done;
        }

        match serde_json::from_str::<StreamResponse>(data) {
            Ok(resp) => {
                if let Some(error) = resp.error {
                    return Parsed::Failed(ProviderError::StreamInterrupted(
                        error.message.unwrap_or_else(|| "upstream error".into()),
                    ));
                }
                resp.choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.delta.content)
                    .map(Parsed::Text)
                    .unwrap_or(Parsed::Skip)
            }
            Err(_) => Parsed::Skip,
        }
    }
}

#[async_trait]
impl docchat_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream(&self, request: GenerationRequest) -> Result<ChunkReceiver, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request);

        debug!(provider = %self.name, model = %request.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = upstream::check_status(&self.name, response).await?;

        Ok(upstream::pump(self.name.clone(), response, Self::parse_event))
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

/// A single SSE `data: {...}` chunk from a streaming response.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    #[serde(default)]
    message: Option<String>,
}
