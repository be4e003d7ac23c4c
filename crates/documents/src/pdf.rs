//! PDF page extraction.

use std::path::Path;

use docchat_core::error::DocumentError;

/// Turns a paginated file into one string per page, in page order.
pub trait PageExtractor: Send + Sync {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, DocumentError>;
}

/// [`PageExtractor`] backed by the `pdf-extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractPages;

impl PageExtractor for PdfExtractPages {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, DocumentError> {
        let name = file_name(path);

        let bytes = std::fs::read(path).map_err(|e| DocumentError::Unreadable {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
            DocumentError::PdfExtraction {
                name,
                reason: e.to_string(),
            }
        })
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
