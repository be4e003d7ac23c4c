//! Error types for the docchat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// `retry_after_secs` comes from the upstream `Retry-After` header.
    #[error("Rate limited by provider{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(", retry after {secs}s"),
        None => String::new(),
    }
}

/// Failures while turning a single source file into text.
///
/// These never abort context building; the builder records them as
/// skipped files and moves on.
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    #[error("Failed to read {name}: {reason}")]
    Unreadable { name: String, reason: String },

    #[error("Failed to extract text from PDF {name}: {reason}")]
    PdfExtraction { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 500,
            message: "Internal failure".into(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("Internal failure"));
    }

    #[test]
    fn rate_limit_mentions_retry_only_when_known() {
        let known = ProviderError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert_eq!(
            known.to_string(),
            "Rate limited by provider, retry after 30s"
        );

        let unknown = ProviderError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(unknown.to_string(), "Rate limited by provider");
    }

    #[test]
    fn document_error_displays_correctly() {
        let err = DocumentError::PdfExtraction {
            name: "report.pdf".into(),
            reason: "invalid xref".into(),
        };
        assert!(err.to_string().contains("report.pdf"));
        assert!(err.to_string().contains("invalid xref"));
    }
}
