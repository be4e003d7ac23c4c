//! Client-facing stream events.
//!
//! `StreamEvent` is what the relay produces and the gateway writes to the
//! wire. Each event becomes one server-sent-event frame of the form
//! `data: <payload>\n\n`:
//!
//! - `chunk`     — `{"chunk":"<fragment>"}`, zero or more, in arrival order
//! - `citations` — `{"citations":[...]}`, at most one, after all chunks
//! - `done`      — the literal `[DONE]`, always last

use serde::Serialize;

use crate::citation::Citation;

/// Payload of the completion sentinel frame.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Events emitted to the client during a chat stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text fragment exactly as the model produced it.
    Chunk(String),

    /// Citations extracted from the finished answer.
    Citations(Vec<Citation>),

    /// The stream is complete.
    Done,
}

#[derive(Serialize)]
struct ChunkPayload<'a> {
    chunk: &'a str,
}

#[derive(Serialize)]
struct CitationsPayload<'a> {
    citations: &'a [Citation],
}

impl StreamEvent {
    /// Short name for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Chunk(_) => "chunk",
            Self::Citations(_) => "citations",
            Self::Done => "done",
        }
    }

    /// The `data:` payload of this event's frame.
    pub fn payload(&self) -> String {
        match self {
            Self::Chunk(text) => {
                serde_json::to_string(&ChunkPayload { chunk: text }).unwrap_or_default()
            }
            Self::Citations(citations) => {
                serde_json::to_string(&CitationsPayload { citations }).unwrap_or_default()
            }
            Self::Done => DONE_SENTINEL.to_string(),
        }
    }

    /// The complete wire frame, terminator included.
    pub fn to_frame(&self) -> String {
        format!("data: {}\n\n", self.payload())
    }
}
