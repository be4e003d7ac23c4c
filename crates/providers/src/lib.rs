//! LLM Provider implementations for docchat.
//!
//! All providers implement the `docchat_core::Provider` trait and speak a
//! streaming protocol (server-sent events) to their upstream API.
//! The router selects the correct provider based on configuration.

pub mod gemini;
pub mod openai_compat;
pub mod router;
pub mod sse;

mod upstream;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
pub use sse::SseDecoder;
