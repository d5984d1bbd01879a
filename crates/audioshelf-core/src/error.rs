//! Error types for the audioshelf core.
//!
//! Most failures in this library degrade softly at the source boundary
//! (empty search results, absent details) and never reach the caller as
//! errors. The variants here cover the cases that do.

use thiserror::Error;

/// Error type for source and aggregation operations.
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// URL could not be parsed or resolved
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Response body had an unexpected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Rate limited by the server (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Requested resource was not found (HTTP 404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// No sources are configured; searching is impossible
    #[error("No sources configured")]
    NoSources,

    /// A selected item's source is no longer in the registry
    #[error("Unknown source: {0}")]
    UnknownSource(String),
}

/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse_error() {
        let error = SourceError::Parse("missing element".to_string());
        assert_eq!(
            error.to_string(),
            "Failed to parse response: missing element"
        );
    }

    #[test]
    fn test_display_rate_limited() {
        let error = SourceError::RateLimited;
        assert_eq!(error.to_string(), "Rate limited - too many requests");
    }

    #[test]
    fn test_display_not_found() {
        let error = SourceError::NotFound("https://example.com/book".to_string());
        assert_eq!(
            error.to_string(),
            "Resource not found: https://example.com/book"
        );
    }

    #[test]
    fn test_display_no_sources() {
        assert_eq!(SourceError::NoSources.to_string(), "No sources configured");
    }

    #[test]
    fn test_display_unknown_source() {
        let error = SourceError::UnknownSource("LibriVox".to_string());
        assert_eq!(error.to_string(), "Unknown source: LibriVox");
    }

    #[test]
    fn test_from_url_parse_error() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let error: SourceError = parse_err.into();
        assert!(matches!(error, SourceError::UrlParse(_)));
    }
}
