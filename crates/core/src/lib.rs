//! # docchat Core
//!
//! Domain types, traits, and error definitions for the docchat retrieval
//! chat backend. This crate has **no framework dependencies**: it defines
//! the domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! The one external collaborator with behaviour worth swapping (the hosted
//! LLM) is defined as a trait here. Implementations live in
//! `docchat-providers`. This enables:
//! - Swapping providers via configuration
//! - Testing the relay and gateway with scripted mock providers
//! - Clean dependency graph (all crates depend inward on core)

pub mod citation;
pub mod document;
pub mod error;
pub mod event;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use citation::Citation;
pub use document::{Document, DocumentBody, LoadOutcome, SkipReason};
pub use error::{DocumentError, ProviderError};
pub use event::StreamEvent;
pub use provider::{ChunkReceiver, GenerationRequest, Provider, StreamChunk};
