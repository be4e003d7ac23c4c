//! Google Gemini provider implementation.
//!
//! Uses the Generative Language REST API in streaming mode:
//! `POST {base}/models/{model}:streamGenerateContent?alt=sse`.
//! Each SSE event carries a `GenerateContentResponse`; the text fragment
//! of an event is the concatenation of `candidates[0].content.parts[*].text`.

use async_trait::async_trait;
use docchat_core::error::ProviderError;
use docchat_core::provider::{ChunkReceiver, GenerationRequest};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::upstream::{self, Parsed};

/// Public endpoint of the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A Gemini LLM provider.
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider against the public Gemini endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, None)
    }

    /// Create a provider against a custom endpoint (proxies, tests).
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        // No overall timeout: a streaming answer may legitimately take minutes.
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout.unwrap_or(Duration::from_secs(10)))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        )
    }

    fn request_body(request: &GenerationRequest) -> serde_json::Value {
        let mut generation_config = serde_json::json!({
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = serde_json::json!(max_tokens);
        }

        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }]
            }],
            "generationConfig": generation_config,
        })
    }

    /// Interpret one SSE `data:` payload.
    fn parse_event(data: &str) -> Parsed {
        let event: StreamResponse = match serde_json::from_str(data) {
            Ok(event) => event,
            Err(_) => return Parsed::Skip,
        };

        if let Some(error) = event.error {
            return Parsed::Failed(ProviderError::ApiError {
                status_code: error.code.unwrap_or(500),
                message: error.message.unwrap_or_default(),
            });
        }

        let Some(candidate) = event.candidates.into_iter().next() else {
            if let Some(reason) = event.prompt_feedback.and_then(|f| f.block_reason) {
                return Parsed::Failed(ProviderError::ApiError {
                    status_code: 400,
                    message: format!("Prompt blocked: {reason}"),
                });
            }
            return Parsed::Skip;
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        Parsed::Text(text)
    }
}

#[async_trait]
impl docchat_core::Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn stream(&self, request: GenerationRequest) -> Result<ChunkReceiver, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::AuthenticationFailed(
                "No API key configured for gemini (set GOOGLE_API_KEY)".into(),
            ));
        }

        let url = self.stream_url(&request.model);
        let body = Self::request_body(&request);

        debug!(provider = "gemini", model = %request.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = upstream::check_status("gemini", response).await?;

        Ok(upstream::pump("gemini".into(), response, Self::parse_event))
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_core::Provider;

    #[test]
    fn stream_url_shape() {
        let provider = GeminiProvider::new("key").unwrap();
        assert_eq!(
            provider.stream_url("gemini-2.0-flash-exp"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn request_body_shape() {
        let mut req = GenerationRequest::new("m", "What is Rust?");
        req.max_tokens = Some(256);
        let body = GeminiProvider::request_body(&req);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "What is Rust?");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
    }

    #[test]
    fn parse_text_event_joins_parts() {
        let data = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello"},{"text":", world"}]}}]}"#;
        assert!(matches!(
            GeminiProvider::parse_event(data),
            Parsed::Text(text) if text == "Hello, world"
        ));
    }

    #[test]
    fn parse_finish_event_without_text() {
        let data = r#"{"candidates":[{"finishReason":"STOP"}],"usageMetadata":{"totalTokenCount":12}}"#;
        assert!(matches!(
            GeminiProvider::parse_event(data),
            Parsed::Text(text) if text.is_empty()
        ));
    }

    #[test]
    fn parse_error_event() {
        let data = r#"{"error":{"code":503,"message":"overloaded","status":"UNAVAILABLE"}}"#;
        match GeminiProvider::parse_event(data) {
            Parsed::Failed(ProviderError::ApiError {
                status_code,
                message,
            }) => {
                assert_eq!(status_code, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn parse_blocked_prompt() {
        let data = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(matches!(
            GeminiProvider::parse_event(data),
            Parsed::Failed(ProviderError::ApiError { .. })
        ));
    }

    #[test]
    fn parse_garbage_is_skipped() {
        assert!(matches!(GeminiProvider::parse_event("not json"), Parsed::Skip));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_streaming() {
        let provider = GeminiProvider::new("").unwrap();
        let err = provider
            .stream(GenerationRequest::new("m", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }

    async fn serve_once(status: axum::http::StatusCode, body: &'static str) -> String {
        use axum::{Router, routing::post};

        let app = Router::new().route(
            "/models/{model}",
            post(move || async move {
                (
                    status,
                    [(axum::http::header::CONTENT_TYPE, "text/event-stream")],
                    body,
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn streams_fragments_from_local_server() {
        let base = serve_once(
            axum::http::StatusCode::OK,
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Rust is \"}]}}]}\r\n\r\n\
             data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"fast [1]\"}]}}]}\r\n\r\n\
             data: {\"candidates\":[{\"finishReason\":\"STOP\"}]}\r\n\r\n",
        )
        .await;

        let provider = GeminiProvider::with_base_url(base, "test-key", None).unwrap();
        let mut rx = provider
            .stream(GenerationRequest::new("gemini-test", "q"))
            .await
            .unwrap();

        let mut text = String::new();
        let mut finished = false;
        while let Some(item) = rx.recv().await {
            let chunk = item.unwrap();
            if chunk.done {
                finished = true;
                break;
            }
            text.push_str(chunk.content.as_deref().unwrap_or_default());
        }
        assert!(finished);
        assert_eq!(text, "Rust is fast [1]");
    }

    #[tokio::test]
    async fn unauthorized_status_maps_to_auth_error() {
        let base = serve_once(axum::http::StatusCode::FORBIDDEN, "denied").await;
        let provider = GeminiProvider::with_base_url(base, "bad-key", None).unwrap();
        let err = provider
            .stream(GenerationRequest::new("gemini-test", "q"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn server_error_maps_to_api_error() {
        let base = serve_once(axum::http::StatusCode::BAD_REQUEST, "API key not valid").await;
        let provider = GeminiProvider::with_base_url(base, "bad-key", None).unwrap();
        match provider
            .stream(GenerationRequest::new("gemini-test", "q"))
            .await
            .unwrap_err()
        {
            ProviderError::ApiError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 400);
                assert!(message.contains("API key not valid"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
