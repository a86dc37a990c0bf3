//! Error types for the amendment engine
//!
//! Two families: [`EngineError`] for load failures (the only hard failures),
//! and [`QueryError`] for the structured "no answer" outcomes of queries
//! (document not loaded, article not found, index out of range). A
//! `QueryError` serializes to `{"error": <message>, ...context}` so callers
//! can hand it to consumers exactly like a successful result.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Main error type for loading documents
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to load a document (retrieval or limits)
    #[error("Failed to load {kind} document: {message}")]
    LoadError { kind: DocumentKind, message: String },

    /// JSON parsing error
    #[error("JSON parse error in {kind} document: {source}")]
    JsonError {
        kind: DocumentKind,
        #[source]
        source: serde_json::Error,
    },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Which of the two source documents an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Decree,
    Amendment,
}

impl DocumentKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decree => "decree",
            Self::Amendment => "amendment",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured outcome of a query that has no answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A required document has not been loaded into the session
    #[error("{} data not loaded", capitalize(.0.as_str()))]
    NotLoaded(DocumentKind),

    /// No article with this exact number exists in the decree
    #[error("Article {article_number} not found")]
    ArticleNotFound { article_number: String },

    /// Amendment index outside `[0, total)`
    #[error("Amendment index {index} out of range. Total amendments: {total}")]
    IndexOutOfRange { index: i64, total: usize },
}

impl QueryError {
    pub fn article_not_found(article_number: impl Into<String>) -> Self {
        Self::ArticleNotFound {
            article_number: article_number.into(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Serialize for QueryError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("error", &self.to_string())?;
        match self {
            Self::NotLoaded(kind) => map.serialize_entry("document", kind.as_str())?,
            Self::ArticleNotFound { article_number } => {
                map.serialize_entry("article_number", article_number)?;
            }
            Self::IndexOutOfRange { index, total } => {
                map.serialize_entry("index", index)?;
                map.serialize_entry("total", total)?;
            }
        }
        map.end()
    }
}
