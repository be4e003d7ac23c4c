//! Shared plumbing for streaming HTTP providers.

use docchat_core::error::ProviderError;
use docchat_core::provider::{ChunkReceiver, StreamChunk};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::sse::SseDecoder;

/// What a provider made of one SSE `data:` payload.
#[derive(Debug)]
pub(crate) enum Parsed {
    /// A text fragment (may be empty; empty fragments are not forwarded).
    Text(String),
    /// The upstream signalled end of stream.
    Done,
    /// Nothing of interest (keep-alives, usage-only frames, unknown shapes).
    Skip,
    /// The upstream reported an error inside the stream.
    Failed(ProviderError),
}

/// Map non-success HTTP statuses to provider errors.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after_secs = retry_after(response.headers());
        warn!(provider, ?retry_after_secs, "Provider rate limited the request");
        return Err(ProviderError::RateLimited { retry_after_secs });
    }

    if status == 401 || status == 403 {
        return Err(ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ));
    }

    if status != 200 {
        let error_body = response.text().await.unwrap_or_default();
        warn!(provider, status, body = %error_body, "Provider streaming error");
        return Err(ProviderError::ApiError {
            status_code: status,
            message: error_body,
        });
    }

    Ok(response)
}

/// Seconds from a `Retry-After` header. HTTP-date values are ignored.
pub(crate) fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Spawn a task that reads the SSE body and forwards parsed fragments.
///
/// The receiver yields `Ok(text)` chunks in arrival order, then exactly one
/// terminal item: `Ok(StreamChunk::finished())` or an `Err`. The task stops
/// early if the receiver is dropped.
pub(crate) fn pump<F>(provider: String, response: reqwest::Response, parse: F) -> ChunkReceiver
where
    F: Fn(&str) -> Parsed + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::channel(64);

    tokio::spawn(async move {
        let mut byte_stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let bytes = match chunk_result {
                Ok(b) => b,
                Err(e) => {
                    let _ = tx
                        .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                        .await;
                    return;
                }
            };

            for data in decoder.push(&bytes) {
                let parsed = parse(&data);
                match forward(&provider, &data, parsed, &tx).await {
                    Flow::Continue => {}
                    Flow::Stop => return,
                }
            }
        }

        if let Some(data) = decoder.finish() {
            let parsed = parse(&data);
            if let Flow::Stop = forward(&provider, &data, parsed, &tx).await {
                return;
            }
        }

        // Stream ended without an explicit terminator
        let _ = tx.send(Ok(StreamChunk::finished())).await;
    });

    rx
}

enum Flow {
    Continue,
    Stop,
}

async fn forward(
    provider: &str,
    data: &str,
    parsed: Parsed,
    tx: &mpsc::Sender<Result<StreamChunk, ProviderError>>,
) -> Flow {
    match parsed {
        Parsed::Text(text) if text.is_empty() => Flow::Continue,
        Parsed::Text(text) => {
            if tx.send(Ok(StreamChunk::text(text))).await.is_err() {
                return Flow::Stop; // receiver dropped
            }
            Flow::Continue
        }
        Parsed::Done => {
            let _ = tx.send(Ok(StreamChunk::finished())).await;
            Flow::Stop
        }
        Parsed::Skip => {
            trace!(provider, data, "Ignoring SSE payload");
            Flow::Continue
        }
        Parsed::Failed(err) => {
            let _ = tx.send(Err(err)).await;
            Flow::Stop
        }
    }
}
