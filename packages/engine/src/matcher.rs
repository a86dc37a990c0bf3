//! Amendment matcher
//!
//! Filters an amendment sequence by target article or by amendment type.
//! Matches always come back in the original amendment order and are never
//! merged or deduplicated; several amendments may target the same article.

use serde::Serialize;

use crate::model::{Amendment, Clause, Target};

/// An amendment matched against an article query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedAmendment {
    pub amendment_type: Option<String>,
    pub target: Target,
    pub text: String,
    pub clauses: Vec<Clause>,
    /// Present (possibly `null`) exactly when the target carries the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_after_article: Option<Option<String>>,
}

impl From<&Amendment> for MatchedAmendment {
    fn from(amendment: &Amendment) -> Self {
        Self {
            amendment_type: amendment.amendment_type.clone(),
            target: amendment.target.clone(),
            text: amendment.text_or_empty().to_string(),
            clauses: amendment.clauses.clone(),
            insert_after_article: amendment.target.insert_after_article.clone(),
        }
    }
}

/// All amendments touching one article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleChanges {
    pub article_number: String,
    pub changes: Vec<MatchedAmendment>,
    pub total_changes: usize,
}

/// An amendment matched against a type query, with its position in the set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeMatch {
    pub index: usize,
    pub amendment_type: Option<String>,
    pub target_section: Option<String>,
    pub target_clause: Option<String>,
    pub has_text: bool,
    pub has_clauses: bool,
}

/// Result of a type search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSearch {
    pub amendment_type: String,
    pub matches: Vec<TypeMatch>,
    pub total_matches: usize,
}

/// Amendments whose `target.article_number` equals `article_number` exactly,
/// in their original relative order.
pub fn match_by_article(amendments: &[Amendment], article_number: &str) -> Vec<MatchedAmendment> {
    amendments
        .iter()
        .filter(|a| a.target.targets_article(article_number))
        .map(MatchedAmendment::from)
        .collect()
}

/// [`match_by_article`] wrapped with the query and count.
pub fn changes_in_article(amendments: &[Amendment], article_number: &str) -> ArticleChanges {
    let changes = match_by_article(amendments, article_number);
    tracing::debug!(article_number, matches = changes.len(), "Matched amendments by article");
    ArticleChanges {
        article_number: article_number.to_string(),
        total_changes: changes.len(),
        changes,
    }
}

/// Amendments whose `amendment_type` equals `kind` ignoring case.
///
/// A missing type compares as the empty string.
pub fn match_by_type(amendments: &[Amendment], kind: &str) -> Vec<TypeMatch> {
    let wanted = kind.to_lowercase();

    amendments
        .iter()
        .enumerate()
        .filter(|(_, a)| a.amendment_type.as_deref().unwrap_or_default().to_lowercase() == wanted)
        .map(|(index, a)| TypeMatch {
            index,
            amendment_type: a.amendment_type.clone(),
            target_section: a.target.article_number.clone(),
            target_clause: a.target.clause_number.clone(),
            has_text: a.has_text(),
            has_clauses: a.has_clauses(),
        })
        .collect()
}

/// [`match_by_type`] wrapped with the query and count.
pub fn search_by_type(amendments: &[Amendment], kind: &str) -> TypeSearch {
    let matches = match_by_type(amendments, kind);
    TypeSearch {
        amendment_type: kind.to_string(),
        total_matches: matches.len(),
        matches,
    }
}
