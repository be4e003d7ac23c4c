//! Streaming relay: upstream fragments → client events.
//!
//! `open` starts the upstream call and returns as soon as the provider has
//! accepted it, so a failure to start can still become a normal error
//! response. Everything after that happens in a spawned task writing into a
//! bounded channel:
//!
//! 1. each non-empty fragment is forwarded verbatim as `Chunk`
//! 2. when the upstream finishes, citations are extracted from the full
//!    answer and sent if there are any
//! 3. `Done` is sent last
//!
//! An upstream failure mid-stream ends the channel with `Err` and no `Done`.
//! If the receiver is dropped the task stops reading from the upstream.

use std::sync::Arc;

use docchat_config::AppConfig;
use docchat_core::error::ProviderError;
use docchat_core::provider::{ChunkReceiver, GenerationRequest, Provider};
use docchat_core::{Citation, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::citations::extract_citations;

/// Capacity of the relay → client channel.
const EVENT_BUFFER: usize = 64;

/// Receiving half of a relay.
pub type EventStream = mpsc::Receiver<Result<StreamEvent, RelayError>>;

#[derive(Debug, Clone, Error)]
pub enum RelayError {
    #[error("Upstream failed mid-stream: {0}")]
    Upstream(#[from] ProviderError),
}

/// Relays one prompt at a time from a provider to a client.
#[derive(Clone)]
pub struct ChatRelay {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ChatRelay {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    /// Relay using the configured default model settings.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(
            provider,
            config.default_model.clone(),
            config.default_temperature,
            config.default_max_tokens,
        )
    }

    /// Start streaming an answer to `prompt`.
    ///
    /// Errors are those raised before the first fragment; later failures
    /// arrive on the returned stream.
    pub async fn open(&self, prompt: impl Into<String>) -> Result<EventStream, ProviderError> {
        let mut request = GenerationRequest::new(self.model.clone(), prompt);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            prompt_chars = request.prompt.len(),
            "Opening upstream stream"
        );

        let upstream = self.provider.stream(request).await.inspect_err(|e| {
            error!(provider = self.provider.name(), error = %e, "Upstream request failed");
        })?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(forward(self.provider.name().to_string(), upstream, tx));

        Ok(rx)
    }
}

async fn forward(
    provider: String,
    mut upstream: ChunkReceiver,
    tx: mpsc::Sender<Result<StreamEvent, RelayError>>,
) {
    let mut answer = String::new();
    let mut fragments = 0usize;

    while let Some(item) = upstream.recv().await {
        match item {
            Ok(chunk) => {
                if let Some(text) = chunk.content.filter(|t| !t.is_empty()) {
                    answer.push_str(&text);
                    fragments += 1;
                    if tx.send(Ok(StreamEvent::Chunk(text))).await.is_err() {
                        debug!(provider = %provider, fragments, "Client disconnected, abandoning stream");
                        return;
                    }
                }
                if chunk.done {
                    break;
                }
            }
            Err(e) => {
                error!(provider = %provider, fragments, error = %e, "Upstream stream failed");
                let _ = tx.send(Err(RelayError::Upstream(e))).await;
                return;
            }
        }
    }

    let citations = extract_citations(&answer);
    info!(
        provider = %provider,
        fragments,
        answer_chars = answer.len(),
        citations = citations.len(),
        "Answer complete"
    );

    if !citations.is_empty() && tx.send(Ok(StreamEvent::Citations(citations))).await.is_err() {
        return;
    }
    let _ = tx.send(Ok(StreamEvent::Done)).await;
}

/// A fully drained relay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    /// Concatenation of every chunk, exactly as the model produced it.
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Drain an event stream into an [`Answer`].
pub async fn collect(mut events: EventStream) -> Result<Answer, RelayError> {
    let mut answer = Answer::default();

    while let Some(event) = events.recv().await {
        match event? {
            StreamEvent::Chunk(text) => answer.text.push_str(&text),
            StreamEvent::Citations(citations) => answer.citations = citations,
            StreamEvent::Done => break,
        }
    }

    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docchat_core::provider::StreamChunk;
    use std::sync::Mutex;

    /// Provider that replays a fixed script of stream items.
    struct ScriptedProvider {
        script: Vec<Result<StreamChunk, ProviderError>>,
        fail_to_start: Option<ProviderError>,
        last_request: Mutex<Option<GenerationRequest>>,
    }

    impl ScriptedProvider {
        fn fragments(fragments: &[&str]) -> Self {
            let mut script: Vec<_> = fragments.iter().map(|f| Ok(StreamChunk::text(*f))).collect();
            script.push(Ok(StreamChunk::finished()));
            Self::new(script)
        }

        fn new(script: Vec<Result<StreamChunk, ProviderError>>) -> Self {
            Self {
                script,
                fail_to_start: None,
                last_request: Mutex::new(None),
            }
        }

        fn failing(err: ProviderError) -> Self {
            Self {
                fail_to_start: Some(err),
                ..Self::new(Vec::new())
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn stream(&self, request: GenerationRequest) -> Result<ChunkReceiver, ProviderError> {
            *self.last_request.lock().unwrap() = Some(request);
            if let Some(err) = &self.fail_to_start {
                return Err(err.clone());
            }
            let (tx, rx) = mpsc::channel(self.script.len().max(1));
            for item in self.script.clone() {
                tx.send(item).await.unwrap();
            }
            Ok(rx)
        }
    }

    async fn drain(mut events: EventStream) -> Vec<Result<StreamEvent, RelayError>> {
        let mut out = Vec::new();
        while let Some(event) = events.recv().await {
            out.push(event);
        }
        out
    }

    fn relay(provider: ScriptedProvider) -> ChatRelay {
        ChatRelay::new(Arc::new(provider), "test-model", 0.2, Some(128))
    }

    #[tokio::test]
    async fn chunks_then_citations_then_done() {
        let relay = relay(ScriptedProvider::fragments(&[
            "Rust is fast [1].",
            "\n\nReferences:\n[REFERENCES: { \"files\": ",
            "[\"a.txt\"] }]",
        ]));

        let events: Vec<StreamEvent> = drain(relay.open("prompt").await.unwrap())
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(
            events,
            vec![
                StreamEvent::Chunk("Rust is fast [1].".into()),
                StreamEvent::Chunk("\n\nReferences:\n[REFERENCES: { \"files\": ".into()),
                StreamEvent::Chunk("[\"a.txt\"] }]".into()),
                StreamEvent::Citations(vec![Citation::new(1, "a.txt")]),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn no_marker_means_no_citation_event() {
        let relay = relay(ScriptedProvider::fragments(&["I'm sorry ", "I can't help with that"]));
        let events = drain(relay.open("prompt").await.unwrap()).await;

        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| !matches!(e, Ok(StreamEvent::Citations(_)))));
        assert!(matches!(events.last(), Some(Ok(StreamEvent::Done))));
    }

    #[tokio::test]
    async fn empty_fragments_are_not_forwarded() {
        let relay = relay(ScriptedProvider::new(vec![
            Ok(StreamChunk::text("")),
            Ok(StreamChunk::default()),
            Ok(StreamChunk::text("ok")),
            Ok(StreamChunk::finished()),
        ]));
        let answer = collect(relay.open("prompt").await.unwrap()).await.unwrap();
        assert_eq!(answer.text, "ok");
    }

    #[tokio::test]
    async fn request_carries_model_settings() {
        let provider = Arc::new(ScriptedProvider::fragments(&["x"]));
        let relay = ChatRelay::new(provider.clone(), "gemini-test", 0.3, Some(64));
        collect(relay.open("the prompt").await.unwrap()).await.unwrap();

        let request = provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, "gemini-test");
        assert_eq!(request.prompt, "the prompt");
        assert!((request.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, Some(64));
    }

    #[tokio::test]
    async fn start_failure_is_returned_from_open() {
        let relay = relay(ScriptedProvider::failing(ProviderError::AuthenticationFailed(
            "bad key".into(),
        )));
        let err = relay.open("prompt").await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn mid_stream_failure_ends_without_done() {
        let relay = relay(ScriptedProvider::new(vec![
            Ok(StreamChunk::text("partial ")),
            Err(ProviderError::StreamInterrupted("connection reset".into())),
            Ok(StreamChunk::text("never sent")),
        ]));
        let events = drain(relay.open("prompt").await.unwrap()).await;

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Ok(StreamEvent::Chunk(t)) if t == "partial "));
        assert!(matches!(&events[1], Err(RelayError::Upstream(_))));
    }

    #[tokio::test]
    async fn collect_surfaces_mid_stream_failure() {
        let relay = relay(ScriptedProvider::new(vec![Err(ProviderError::Network(
            "dns".into(),
        ))]));
        let err = collect(relay.open("prompt").await.unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("dns"));
    }

    #[tokio::test]
    async fn upstream_closing_without_terminator_still_completes() {
        let relay = relay(ScriptedProvider::new(vec![Ok(StreamChunk::text("tail"))]));
        let answer = collect(relay.open("prompt").await.unwrap()).await.unwrap();
        assert_eq!(answer, Answer {
            text: "tail".into(),
            citations: Vec::new(),
        });
    }

    #[tokio::test]
    async fn chunks_concatenate_to_raw_output() {
        let fragments = ["Alpha ", "[1] beta", " [2]\nReferences:\n", "[REFERENCES: {\"files\": [\"x.txt\", \"y.pdf\"]}]"];
        let relay = relay(ScriptedProvider::fragments(&fragments));
        let answer = collect(relay.open("prompt").await.unwrap()).await.unwrap();

        assert_eq!(answer.text, fragments.concat());
        assert_eq!(answer.citations, vec![Citation::new(1, "x.txt"), Citation::new(2, "y.pdf")]);
    }
}
