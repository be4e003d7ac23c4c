//! Citation value object.

use serde::{Deserialize, Serialize};

/// A reference to a source file the model claims to have used.
///
/// Citations are created once, at the end of a stream, from the model's
/// `[REFERENCES: ...]` marker. `page` and `content` are reserved for
/// excerpt linking and are always `null` / empty today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based position in the marker's `files` list.
    pub id: u32,
    /// Source file name as written by the model.
    pub source: String,
    pub page: Option<u32>,
    pub content: String,
}

impl Citation {
    /// A citation with no page or excerpt information.
    pub fn new(id: u32, source: impl Into<String>) -> Self {
        Self {
            id,
            source: source.into(),
            page: None,
            content: String::new(),
        }
    }
}
