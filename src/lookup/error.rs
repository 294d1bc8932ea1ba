//! Error types for SPARQL lookups

use thiserror::Error;

/// Errors that can occur while querying a SPARQL endpoint
#[derive(Error, Debug)]
pub enum LookupError {
    /// HTTP request error (connection, TLS, client timeout)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status
    #[error("Endpoint returned status {0}")]
    Status(u16),

    /// Response body is not a SPARQL JSON result
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Endpoint URL cannot be parsed
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Configured header value is not valid HTTP
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl LookupError {
    /// Whether re-issuing the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::Decode(_) | Self::InvalidUrl(_) | Self::InvalidHeader(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transience() {
        assert!(LookupError::Status(503).is_transient());
        assert!(LookupError::Status(429).is_transient());
        assert!(!LookupError::Status(400).is_transient());
        assert!(!LookupError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LookupError::Status(502).to_string(),
            "Endpoint returned status 502"
        );
    }
}
