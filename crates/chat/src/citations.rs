//! Citation marker extraction.
//!
//! The model is asked to end its answer with
//!
//! ```text
//! References:
//! [REFERENCES: { "files": ["a.txt", "b.pdf"] }]
//! ```
//!
//! The marker is located with a small scanner rather than a pattern match:
//! the JSON object is delimited by balanced braces, skipping over string
//! literals, so filenames containing `}` or `]` do not cut it short.

use docchat_core::Citation;
use serde::Deserialize;
use tracing::{debug, warn};

const MARKER: &str = "[REFERENCES:";

#[derive(Deserialize)]
struct References {
    #[serde(default)]
    files: Vec<String>,
}

/// Extract citations from a finished answer.
///
/// Returns one citation per listed file, in order, with ids starting at 1.
/// No marker, or a marker whose JSON does not parse, yields an empty list.
pub fn extract_citations(text: &str) -> Vec<Citation> {
    let mut from = 0;

    while let Some(offset) = text[from..].find(MARKER) {
        let body_start = from + offset + MARKER.len();

        match marker_object(&text[body_start..]) {
            Ok(json) => return parse_files(json),
            Err(reason) => warn!(
                offset = from + offset,
                %reason,
                "Skipping malformed references marker"
            ),
        }

        from = body_start;
    }

    Vec::new()
}

/// Why a `[REFERENCES:` occurrence did not frame a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Malformed {
    NoObject,
    UnclosedObject,
    UnclosedMarker,
}

impl std::fmt::Display for Malformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoObject => write!(f, "no '{{' after the marker"),
            Self::UnclosedObject => write!(f, "'{{' is never closed"),
            Self::UnclosedMarker => write!(f, "no ']' after the object"),
        }
    }
}

/// The `{...}` slice of a well-formed marker body.
fn marker_object(rest: &str) -> Result<&str, Malformed> {
    let rest = rest.trim_start();
    if !rest.starts_with('{') {
        return Err(Malformed::NoObject);
    }

    let close = matching_brace(rest).ok_or(Malformed::UnclosedObject)?;
    let after = rest[close + 1..].trim_start();
    if !after.starts_with(']') {
        return Err(Malformed::UnclosedMarker);
    }

    Ok(&rest[..=close])
}

/// Byte index of the brace closing the one at index 0.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

fn parse_files(json: &str) -> Vec<Citation> {
    match serde_json::from_str::<References>(json) {
        Ok(refs) => {
            debug!(files = refs.files.len(), "Parsed references marker");
            refs.files
                .into_iter()
                .zip(1u32..)
                .map(|(file, id)| Citation::new(id, file))
                .collect()
        }
        Err(e) => {
            warn!(error = %e, "Malformed references marker");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(citations: &[Citation]) -> Vec<&str> {
        citations.iter().map(|c| c.source.as_str()).collect()
    }

    #[test]
    fn two_files_in_order() {
        let text = "Rust is fast [1] and safe [2].\n\nReferences:\n[REFERENCES: { \"files\": [\"a.txt\", \"b.pdf\"] }]";
        let citations = extract_citations(text);

        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0], Citation::new(1, "a.txt"));
        assert_eq!(citations[1], Citation::new(2, "b.pdf"));
        assert!(citations.iter().all(|c| c.page.is_none() && c.content.is_empty()));
    }

    #[test]
    fn no_marker_is_empty() {
        assert!(extract_citations("I'm sorry I can't help with that").is_empty());
        assert!(extract_citations("").is_empty());
    }

    #[test]
    fn invalid_json_is_empty() {
        assert!(extract_citations("[REFERENCES: { files: [a.txt] }]").is_empty());
    }

    #[test]
    fn non_string_entries_are_malformed() {
        assert!(extract_citations(r#"[REFERENCES: {"files": ["a.txt", 3]}]"#).is_empty());
    }

    #[test]
    fn missing_files_key_is_empty() {
        assert!(extract_citations(r#"[REFERENCES: {"sources": ["a.txt"]}]"#).is_empty());
    }

    #[test]
    fn empty_file_list() {
        assert!(extract_citations(r#"[REFERENCES: {"files": []}]"#).is_empty());
    }

    #[test]
    fn whitespace_and_newlines_inside_marker() {
        let text = "[REFERENCES:\n  {\n    \"files\": [\"notes.md\"]\n  }\n]";
        assert_eq!(sources(&extract_citations(text)), vec!["notes.md"]);
    }

    #[test]
    fn braces_and_brackets_inside_filenames() {
        let text = r#"[REFERENCES: {"files": ["odd}name].txt", "quote\"d.txt"]}]"#;
        assert_eq!(
            sources(&extract_citations(text)),
            vec!["odd}name].txt", "quote\"d.txt"]
        );
    }

    #[test]
    fn unterminated_marker_is_empty() {
        assert!(extract_citations(r#"[REFERENCES: {"files": ["a.txt"]"#).is_empty());
        assert!(extract_citations(r#"[REFERENCES: {"files": ["a.txt"]} trailing"#).is_empty());
    }

    #[test]
    fn first_well_formed_marker_wins() {
        let text = "The format is [REFERENCES: ...] as requested.\n\
                    References:\n[REFERENCES: {\"files\": [\"real.pdf\"]}]\n\
                    [REFERENCES: {\"files\": [\"second.txt\"]}]";
        assert_eq!(sources(&extract_citations(text)), vec!["real.pdf"]);
    }

    #[test]
    fn multibyte_text_around_marker() {
        let text = "Résumé ✓ [1]\n[REFERENCES: {\"files\": [\"café.txt\"]}]";
        assert_eq!(sources(&extract_citations(text)), vec!["café.txt"]);
    }

    #[test]
    fn marker_object_reports_why_it_failed() {
        assert_eq!(marker_object(" { \"files\": [] } ]"), Ok("{ \"files\": [] }"));
        assert_eq!(marker_object(" files ]"), Err(Malformed::NoObject));
        assert_eq!(
            marker_object(" { \"files\": [\"a.txt\"] "),
            Err(Malformed::UnclosedObject)
        );
        assert_eq!(
            marker_object(" { \"files\": [\"a.txt\"] } trailing"),
            Err(Malformed::UnclosedMarker)
        );
    }

    #[test]
    fn unclosed_marker_is_skipped_for_a_later_one() {
        let text = "[REFERENCES: {\"files\": [\"draft.txt\"]} oops\n[REFERENCES: {\"files\": [\"final.txt\"]}]";
        assert_eq!(sources(&extract_citations(text)), vec!["final.txt"]);
    }
}
