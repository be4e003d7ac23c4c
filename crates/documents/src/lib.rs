//! Source documents for docchat.
//!
//! Every chat request rebuilds the context from scratch: the source
//! directory is listed, each regular file is turned into text, and the
//! results are wrapped in filename tags the model can cite.
//!
//! PDF text extraction sits behind the [`PageExtractor`] trait so tests
//! and alternative backends can replace `pdf-extract`.

pub mod context;
pub mod pdf;

pub use context::{ContextBuilder, ContextReport, SkippedFile, render_document};
pub use pdf::{PageExtractor, PdfExtractPages};
