//! Amendment classifier and aggregator
//!
//! Corpus-wide statistics over an amendment set, per-amendment flattened
//! records, and bounds-checked positional access.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::QueryError;
use crate::model::{Amendment, Clause, Target};

/// Aggregated counts and sets for an amendment set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_amendments: usize,
    /// Occurrences per raw amendment type.
    pub amendment_types: BTreeMap<String, usize>,
    pub articles_affected: usize,
    /// Distinct target article numbers, sorted lexicographically.
    pub affected_articles: Vec<String>,
    pub new_articles_added: usize,
    /// Distinct target article numbers carrying `insert_after_article`, sorted.
    pub new_articles: Vec<String>,
}

/// Flattened view of one amendment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    pub amendment_type: Option<String>,
    pub target_article: Option<String>,
    pub target_clause: Option<String>,
    pub is_new_article: bool,
    pub insert_after: Option<String>,
    pub has_text: bool,
    pub has_clauses: bool,
    pub clause_count: usize,
}

impl From<&Amendment> for ChangeRecord {
    fn from(a: &Amendment) -> Self {
        Self {
            amendment_type: a.amendment_type.clone(),
            target_article: a.target.article_number.clone(),
            target_clause: a.target.clause_number.clone(),
            is_new_article: a.is_new_article(),
            insert_after: a.target.insert_after().map(str::to_string),
            has_text: a.has_text(),
            has_clauses: a.has_clauses(),
            clause_count: a.clauses.len(),
        }
    }
}

/// Full summary: statistics plus one record per amendment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeSummary {
    pub summary: SummaryStats,
    pub detailed_changes: Vec<ChangeRecord>,
}

/// The same content as [`ChangeSummary`] under the statistics field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmendmentStatistics {
    pub statistics: SummaryStats,
    pub amendment_breakdown: Vec<ChangeRecord>,
}

impl From<ChangeSummary> for AmendmentStatistics {
    fn from(summary: ChangeSummary) -> Self {
        Self {
            statistics: summary.summary,
            amendment_breakdown: summary.detailed_changes,
        }
    }
}

/// Full record of one amendment addressed by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmendmentDetail {
    pub index: usize,
    pub amendment_type: Option<String>,
    pub target: Target,
    pub text: String,
    pub clauses: Vec<Clause>,
    pub clause_count: usize,
    pub has_text: bool,
    pub has_clauses: bool,
}

/// Summarize an amendment set in a single pass.
pub fn summarize(amendments: &[Amendment]) -> ChangeSummary {
    let mut amendment_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut affected: BTreeSet<&str> = BTreeSet::new();
    let mut new_articles: BTreeSet<&str> = BTreeSet::new();
    let mut detailed_changes = Vec::with_capacity(amendments.len());

    for amendment in amendments {
        *amendment_types
            .entry(amendment.type_label().to_string())
            .or_default() += 1;

        if let Some(article_number) = amendment.target.article_number.as_deref() {
            affected.insert(article_number);
            if amendment.is_new_article() {
                new_articles.insert(article_number);
            }
        }

        detailed_changes.push(ChangeRecord::from(amendment));
    }

    // BTreeSet iteration is already in ascending byte order
    let affected_articles: Vec<String> = affected.into_iter().map(str::to_string).collect();
    let new_articles: Vec<String> = new_articles.into_iter().map(str::to_string).collect();

    tracing::debug!(
        total = amendments.len(),
        affected = affected_articles.len(),
        new = new_articles.len(),
        "Summarized amendments"
    );

    ChangeSummary {
        summary: SummaryStats {
            total_amendments: amendments.len(),
            amendment_types,
            articles_affected: affected_articles.len(),
            affected_articles,
            new_articles_added: new_articles.len(),
            new_articles,
        },
        detailed_changes,
    }
}

/// Resolve a signed, 0-based index into the amendment set.
pub fn amendment_at(
    amendments: &[Amendment],
    index: i64,
) -> Result<(usize, &Amendment), QueryError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| amendments.get(i).map(|a| (i, a)))
        .ok_or(QueryError::IndexOutOfRange {
            index,
            total: amendments.len(),
        })
}

/// Detail record for the amendment at `index`.
pub fn amendment_details(
    amendments: &[Amendment],
    index: i64,
) -> Result<AmendmentDetail, QueryError> {
    let (index, amendment) = amendment_at(amendments, index)?;
    Ok(AmendmentDetail {
        index,
        amendment_type: amendment.amendment_type.clone(),
        target: amendment.target.clone(),
        text: amendment.text_or_empty().to_string(),
        clauses: amendment.clauses.clone(),
        clause_count: amendment.clauses.len(),
        has_text: amendment.has_text(),
        has_clauses: amendment.has_clauses(),
    })
}
