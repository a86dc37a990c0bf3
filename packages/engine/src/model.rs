//! Document model for decrees and amendment sets
//!
//! Both documents arrive as JSON trees:
//!
//! ```json
//! { "metadata": { "title": "...", "decree_number": "118/2021/ND-CP" },
//!   "Decree": { "chapters": [ { "chapter_number": "I", "articles": [
//!       { "article_number": "7", "article_title": "...", "clauses": [ ... ] } ] } ] } }
//!
//! { "metadata": { ... },
//!   "amendments": [ { "amendment_type": "Modification",
//!                     "target": { "article_number": "7", "clause_number": "1" },
//!                     "text": "...", "clauses": [ ... ] } ] }
//! ```
//!
//! Clauses are opaque and passed through unmodified. Identifier fields accept
//! JSON strings or numbers and are normalized to strings. Display-only fields
//! (titles, dates, page counts) accept any JSON value.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::config;
use crate::error::{DocumentKind, EngineError, Result};

/// A clause is opaque structured content, kept exactly as loaded.
pub type Clause = Value;

/// The three amendment types that carry defined semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AmendmentKind {
    Addition,
    Modification,
    Deletion,
}

impl AmendmentKind {
    /// Classify a raw `amendment_type` value. Matching is exact; anything
    /// else is unclassified.
    #[must_use]
    pub fn classify(raw: &str) -> Option<Self> {
        match raw {
            "Addition" => Some(Self::Addition),
            "Modification" => Some(Self::Modification),
            "Deletion" => Some(Self::Deletion),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Addition => "Addition",
            Self::Modification => "Modification",
            Self::Deletion => "Deletion",
        }
    }
}

/// Document metadata shared by decrees and amendment documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(
        default,
        deserialize_with = "de_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub decree_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_count: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A loaded decree: metadata plus the chapter tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecreeDocument {
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(rename = "Decree", default)]
    pub decree: Decree,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decree {
    #[serde(default, deserialize_with = "de_seq")]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default, deserialize_with = "de_label")]
    pub chapter_number: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub chapter_title: Option<String>,
    #[serde(default, deserialize_with = "de_seq")]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, deserialize_with = "de_label")]
    pub article_number: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub article_title: Option<String>,
    #[serde(default, deserialize_with = "de_seq")]
    pub clauses: Vec<Clause>,
}

impl Decree {
    /// All articles in document order, paired with their enclosing chapter.
    pub fn articles(&self) -> impl Iterator<Item = (&Chapter, &Article)> + '_ {
        self.chapters
            .iter()
            .flat_map(|chapter| chapter.articles.iter().map(move |article| (chapter, article)))
    }

    pub fn article_count(&self) -> usize {
        self.chapters.iter().map(|c| c.articles.len()).sum()
    }
}

/// A loaded amendment document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmendmentDocument {
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default, deserialize_with = "de_seq")]
    pub amendments: Vec<Amendment>,
}

/// One amendment entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Amendment {
    #[serde(default)]
    pub amendment_type: Option<String>,
    #[serde(default)]
    pub target: Target,
    #[serde(default, deserialize_with = "de_text")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "de_seq")]
    pub clauses: Vec<Clause>,
}

/// What an amendment points at.
///
/// The `insert_after_article` key being present, even with a `null` value, is
/// the sole signal that the target article does not exist yet in the decree.
/// The outer `Option` records presence, the inner one the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(
        default,
        deserialize_with = "de_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub article_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub clause_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_present_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub insert_after_article: Option<Option<String>>,
    /// Any further target fields, re-emitted unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Target {
    /// Target for an existing article.
    #[must_use]
    pub fn article(article_number: impl Into<String>) -> Self {
        Self {
            article_number: Some(article_number.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_clause(mut self, clause_number: impl Into<String>) -> Self {
        self.clause_number = Some(clause_number.into());
        self
    }

    #[must_use]
    pub fn inserted_after(mut self, article_number: impl Into<String>) -> Self {
        self.insert_after_article = Some(Some(article_number.into()));
        self
    }

    /// True when the target carries the `insert_after_article` key.
    pub fn is_insertion(&self) -> bool {
        self.insert_after_article.is_some()
    }

    /// The article the new one follows, when the key has a value.
    pub fn insert_after(&self) -> Option<&str> {
        self.insert_after_article.as_ref().and_then(Option::as_deref)
    }

    pub fn targets_article(&self, article_number: &str) -> bool {
        self.article_number.as_deref() == Some(article_number)
    }
}

impl Amendment {
    #[must_use]
    pub fn new(amendment_type: impl Into<String>, target: Target) -> Self {
        Self {
            amendment_type: Some(amendment_type.into()),
            target,
            text: None,
            clauses: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_clauses(mut self, clauses: Vec<Clause>) -> Self {
        self.clauses = clauses;
        self
    }

    /// The classified type, if it is one of the three known kinds.
    pub fn kind(&self) -> Option<AmendmentKind> {
        self.amendment_type.as_deref().and_then(AmendmentKind::classify)
    }

    /// The raw type, or the unknown marker used in aggregated counts.
    pub fn type_label(&self) -> &str {
        self.amendment_type
            .as_deref()
            .unwrap_or(config::UNKNOWN_AMENDMENT_TYPE)
    }

    /// Payload text, empty when absent.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn has_text(&self) -> bool {
        !self.text_or_empty().is_empty()
    }

    pub fn has_clauses(&self) -> bool {
        !self.clauses.is_empty()
    }

    /// True when this amendment creates an article that is not in the decree.
    pub fn is_new_article(&self) -> bool {
        self.target.is_insertion()
    }
}

impl DecreeDocument {
    /// Parse a decree from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        check_size(DocumentKind::Decree, bytes.len())?;
        let document: Self =
            serde_json::from_slice(bytes).map_err(|source| EngineError::JsonError {
                kind: DocumentKind::Decree,
                source,
            })?;
        tracing::debug!(
            chapters = document.decree.chapters.len(),
            articles = document.decree.article_count(),
            "Parsed decree successfully"
        );
        Ok(document)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_json_slice(content.as_bytes())
    }
}

impl AmendmentDocument {
    /// Parse an amendment document from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        check_size(DocumentKind::Amendment, bytes.len())?;
        let document: Self =
            serde_json::from_slice(bytes).map_err(|source| EngineError::JsonError {
                kind: DocumentKind::Amendment,
                source,
            })?;

        if document.amendments.len() > config::MAX_AMENDMENTS {
            tracing::warn!(
                count = document.amendments.len(),
                max = config::MAX_AMENDMENTS,
                "Amendment document exceeds amendment limit"
            );
            return Err(EngineError::LoadError {
                kind: DocumentKind::Amendment,
                message: format!(
                    "document contains {} amendments, maximum is {}",
                    document.amendments.len(),
                    config::MAX_AMENDMENTS
                ),
            });
        }

        tracing::debug!(
            amendments = document.amendments.len(),
            "Parsed amendment document successfully"
        );
        Ok(document)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_json_slice(content.as_bytes())
    }
}

fn check_size(kind: DocumentKind, len: usize) -> Result<()> {
    if len > config::MAX_DOCUMENT_SIZE {
        tracing::warn!(
            %kind,
            size = len,
            max = config::MAX_DOCUMENT_SIZE,
            "JSON document exceeds size limit"
        );
        return Err(EngineError::LoadError {
            kind,
            message: format!(
                "document exceeds maximum size limit ({} bytes)",
                config::MAX_DOCUMENT_SIZE
            ),
        });
    }
    Ok(())
}

/// Identifier that may be written as a string or a number in source data.
#[derive(Deserialize)]
#[serde(untagged)]
enum Label {
    Text(String),
    Number(serde_json::Number),
}

fn de_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Label>::deserialize(deserializer)?.map(|label| match label {
        Label::Text(text) => text,
        Label::Number(number) => number.to_string(),
    }))
}

/// Distinguishes a missing key (`None`) from one present with any value,
/// `null` included (`Some(_)`). Only reached when the key exists.
fn de_present_label<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    de_label(deserializer).map(Some)
}

/// Free text shown to readers. Strings are kept, other scalars and
/// structures are rendered as JSON text.
fn de_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

/// Sequences written as `null` are treated as empty.
fn de_seq<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
