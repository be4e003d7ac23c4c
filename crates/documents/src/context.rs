//! Context building: source directory → tagged context string.
//!
//! Block formats:
//!
//! ```text
//! <notes.txt>
//! file content, verbatim
//! </notes.txt>
//!
//! <manual.pdf>
//! [Page 1]: first page text
//! [Page 2]: second page text
//! </manual.pdf>
//! ```
//!
//! Blocks are joined by a blank line in directory listing order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docchat_core::document::{Document, DocumentBody, LoadOutcome, SkipReason};
use docchat_core::error::DocumentError;
use serde::Serialize;
use tracing::{debug, warn};

use crate::pdf::{PageExtractor, PdfExtractPages, file_name};

/// Reads a source directory into documents and renders the context string.
#[derive(Clone)]
pub struct ContextBuilder {
    dir: PathBuf,
    extractor: Arc<dyn PageExtractor>,
}

/// A file that was left out of the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub reason: SkipReason,
}

/// The rendered context plus what was left out of it.
#[derive(Debug, Clone, Serialize)]
pub struct ContextReport {
    pub context: String,
    pub documents: usize,
    /// Total pages across the PDFs that made it into the context.
    pub pages: usize,
    pub skipped: Vec<SkippedFile>,
}

impl ContextBuilder {
    /// Builder over `dir` using the `pdf-extract` backend for PDFs.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extractor: Arc::new(PdfExtractPages),
        }
    }

    /// Replace the PDF page extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn PageExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load every regular file in the directory (non-recursive).
    ///
    /// A missing or unlistable directory yields no outcomes. Entries that
    /// are not regular files are ignored without being reported.
    pub fn load_all(&self) -> Vec<LoadOutcome> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Source directory not readable");
                return Vec::new();
            }
        };

        let mut outcomes = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let outcome = match self.load_file(&path) {
                Ok(doc) => LoadOutcome::Loaded(doc),
                Err(e) => {
                    warn!(error = %e, "Skipping source file");
                    LoadOutcome::from(e)
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    fn load_file(&self, path: &Path) -> Result<Document, DocumentError> {
        let name = file_name(path);

        if is_pdf(&name) {
            let pages = self.extractor.extract_pages(path)?;
            debug!(file = %name, pages = pages.len(), "Loaded PDF");
            return Ok(Document::pages(name, pages));
        }

        let bytes = std::fs::read(path).map_err(|e| DocumentError::Unreadable {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        let content = String::from_utf8(bytes).map_err(|e| DocumentError::Unreadable {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        debug!(file = %name, bytes = content.len(), "Loaded text file");
        Ok(Document::text(name, content))
    }

    /// Render the context string for the current directory contents.
    pub fn build(&self) -> String {
        self.build_report().context
    }

    /// Render the context and collect the files that were skipped.
    pub fn build_report(&self) -> ContextReport {
        let mut blocks = Vec::new();
        let mut pages = 0;
        let mut skipped = Vec::new();

        for outcome in self.load_all() {
            match outcome {
                LoadOutcome::Loaded(doc) => {
                    pages += doc.page_count().unwrap_or(0);
                    blocks.push(render_document(&doc));
                }
                LoadOutcome::Skipped { name, reason } => skipped.push(SkippedFile { name, reason }),
            }
        }

        ContextReport {
            documents: blocks.len(),
            pages,
            context: blocks.join("\n\n"),
            skipped,
        }
    }
}

/// Render one document as a filename-tagged block.
pub fn render_document(doc: &Document) -> String {
    let body = match &doc.body {
        DocumentBody::Text(text) => text.clone(),
        DocumentBody::Pages(pages) => pages
            .iter()
            .enumerate()
            .map(|(i, page)| format!("[Page {}]: {}", i + 1, page))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    format!("<{name}>\n{body}\n</{name}>", name = doc.name)
}

fn is_pdf(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}
