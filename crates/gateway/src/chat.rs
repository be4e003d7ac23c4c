//! `POST /chat` — answer a question over the source documents as SSE.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use docchat_chat::{RelayError, build_prompt};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, trace, warn};

use crate::SharedState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Stream an answer: `{"chunk":..}` frames, an optional `{"citations":..}`
/// frame, then `[DONE]`.
///
/// Errors before streaming starts are JSON: 400 for a missing or empty
/// `message`, 413 past the body limit, 500 for anything else (including a
/// body that is not a JSON object). An upstream failure after that ends the
/// body without `[DONE]`.
pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, RelayError>>>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Unreadable chat request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::payload_too_large(rejection.body_text());
        }
        ApiError::internal(rejection.body_text())
    })?;

    let message = match request.message {
        Some(message) if !message.is_empty() => message,
        _ => return Err(ApiError::bad_request("No message provided")),
    };

    info!(message_len = message.len(), "Chat request");

    // Directory scan and PDF extraction are blocking
    let documents = state.documents.clone();
    let report = tokio::task::spawn_blocking(move || documents.build_report())
        .await
        .map_err(|e| ApiError::internal(format!("Context build failed: {e}")))?;

    debug!(
        documents = report.documents,
        pages = report.pages,
        skipped = report.skipped.len(),
        context_chars = report.context.len(),
        "Context built"
    );

    let prompt = build_prompt(&report.context, &message);
    let events = state
        .relay
        .open(prompt)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let stream = ReceiverStream::new(events).map(|item| {
        item.map(|event| {
            trace!(event = event.event_type(), "SSE frame");
            Event::default().data(event.payload())
        })
    });

    Ok(Sse::new(stream))
}
