//! Source document domain types.
//!
//! A [`Document`] is one file from the source directory, read fully into
//! memory for the duration of a single request. The context builder reports
//! every regular file it looked at as a [`LoadOutcome`], so skipped files
//! are observable instead of silently swallowed.

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// The textual content of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum DocumentBody {
    /// Plain UTF-8 text, used verbatim.
    Text(String),
    /// Ordered page texts from a paginated source (PDF).
    Pages(Vec<String>),
}

/// A single source document, identified by its file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// File name (no directory component). Used as the context tag.
    pub name: String,
    /// Extracted content.
    pub body: DocumentBody,
}

impl Document {
    /// Create a plain-text document.
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: DocumentBody::Text(content.into()),
        }
    }

    /// Create a paginated document.
    pub fn pages(name: impl Into<String>, pages: Vec<String>) -> Self {
        Self {
            name: name.into(),
            body: DocumentBody::Pages(pages),
        }
    }

    /// Number of pages, or `None` for unpaginated text.
    pub fn page_count(&self) -> Option<usize> {
        match &self.body {
            DocumentBody::Text(_) => None,
            DocumentBody::Pages(pages) => Some(pages.len()),
        }
    }
}

/// Why a file was left out of the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// I/O failure or invalid UTF-8.
    Unreadable(String),
    /// The PDF extractor rejected the file.
    PdfExtraction(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable(reason) => write!(f, "unreadable: {reason}"),
            Self::PdfExtraction(reason) => write!(f, "PDF extraction failed: {reason}"),
        }
    }
}

/// Per-file result of a directory scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded(Document),
    Skipped { name: String, reason: SkipReason },
}

impl LoadOutcome {
    /// The file name this outcome refers to.
    pub fn name(&self) -> &str {
        match self {
            Self::Loaded(doc) => &doc.name,
            Self::Skipped { name, .. } => name,
        }
    }

    /// The loaded document, if any.
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Loaded(doc) => Some(doc),
            Self::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

impl From<DocumentError> for LoadOutcome {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Unreadable { name, reason } => Self::Skipped {
                name,
                reason: SkipReason::Unreadable(reason),
            },
            DocumentError::PdfExtraction { name, reason } => Self::Skipped {
                name,
                reason: SkipReason::PdfExtraction(reason),
            },
        }
    }
}
