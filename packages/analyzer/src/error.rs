//! Error types for the analyzer.
//!
//! `AnalyzerError` covers everything that can fail around the engine:
//! fetching documents, parsing them, and writing reports. Query outcomes
//! with no answer are not errors here; they come back from the engine as
//! structured `QueryError` values.

use amendment_engine::{EngineError, QueryError};
use thiserror::Error;

/// Main error type for the analyzer library.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Empty or malformed document reference.
    #[error("Invalid document reference: '{0}'. Expected a local path, http(s):// URL or s3://bucket/key")]
    InvalidReference(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to download a remote document.
    #[error("Failed to download {reference}: {source}")]
    Download {
        reference: String,
        #[source]
        source: reqwest::Error,
    },

    /// Every attempt at a remote document hit a transient failure.
    #[error("Failed to download {reference} after {attempts} attempts: {message}")]
    RetriesExhausted {
        reference: String,
        attempts: u32,
        message: String,
    },

    /// Local document could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Parsing or limit failure inside the engine.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A query the operation depends on had no answer.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for analyzer operations.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use amendment_engine::DocumentKind;

    #[test]
    fn test_error_display() {
        let err = AnalyzerError::InvalidReference("s3://bucket".to_string());
        assert!(err.to_string().contains("s3://bucket"));
        assert!(err.to_string().contains("s3://bucket/key"));
    }

    #[test]
    fn test_engine_error_is_transparent() {
        let err = AnalyzerError::from(EngineError::LoadError {
            kind: DocumentKind::Amendment,
            message: "too large".to_string(),
        });
        assert_eq!(err.to_string(), "Failed to load amendment document: too large");
    }

    #[test]
    fn test_query_error_is_transparent() {
        let err = AnalyzerError::from(QueryError::NotLoaded(DocumentKind::Amendment));
        assert_eq!(err.to_string(), "Amendment data not loaded");
    }

    #[test]
    fn test_retries_exhausted_display() {
        let err = AnalyzerError::RetriesExhausted {
            reference: "s3://legal-amendment-mcp/decrees/d.json".to_string(),
            attempts: 3,
            message: "server error: 503 Service Unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to download s3://legal-amendment-mcp/decrees/d.json after 3 attempts: \
             server error: 503 Service Unavailable"
        );
    }
}
