//! The question-answering pipeline for docchat.
//!
//! A chat turn is: build the context (see `docchat-documents`), assemble
//! the prompt, stream the model's answer to the client while accumulating
//! it, then pull the citation marker out of the finished answer.
//!
//! - [`prompt`] — the instruction template
//! - [`relay`] — upstream fragments → client [`StreamEvent`]s
//! - [`citations`] — `[REFERENCES: {...}]` marker scanner
//!
//! [`StreamEvent`]: docchat_core::StreamEvent

pub mod citations;
pub mod prompt;
pub mod relay;

pub use citations::extract_citations;
pub use prompt::build_prompt;
pub use relay::{Answer, ChatRelay, EventStream, RelayError, collect};
