//! View merger
//!
//! Combines article lookups with matched amendments into two projections:
//! a before/after comparison and a combined article view. Both are pure
//! functions of (decree, amendments, article number).
//!
//! The combined view never rewrites the original clauses. It returns them
//! next to three overlay buckets (additions, modifications, deletions) and
//! leaves applying the overlay to the consumer, so clause renumbering is
//! never guessed here.

use serde::Serialize;

use crate::article::{lookup_article, ArticleContent};
use crate::config;
use crate::error::QueryError;
use crate::matcher::{changes_in_article, ArticleChanges, MatchedAmendment};
use crate::model::{Amendment, AmendmentKind, Clause, Decree};

/// Derived flags for a before/after comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeAnalysis {
    pub has_changes: bool,
    /// Distinct amendment types touching the article, in first-seen order.
    pub change_types: Vec<String>,
    pub is_new_article: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeforeAfter {
    pub article_number: String,
    pub original_content: ArticleContent,
    pub changes: ArticleChanges,
    pub analysis: ChangeAnalysis,
}

/// New content appended to an article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentOverlay {
    pub clauses: Vec<Clause>,
    pub text: String,
}

/// Replacement or removal of one clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClauseOverlay {
    pub target_clause: Option<String>,
    pub clauses: Vec<Clause>,
    pub text: String,
}

/// An existing article with every matching amendment bucketed by type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedArticle {
    pub article_number: String,
    pub title: Option<String>,
    pub chapter_number: Option<String>,
    pub chapter_title: Option<String>,
    /// The originally enacted clauses, untouched by the overlays.
    pub clauses: Vec<Clause>,
    pub modifications: Vec<ClauseOverlay>,
    pub additions: Vec<ContentOverlay>,
    pub deletions: Vec<ClauseOverlay>,
    pub has_changes: bool,
}

/// An article that exists only in the amendment set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewArticleView {
    pub article_number: String,
    pub is_new_article: bool,
    pub content: Vec<Clause>,
    pub text: String,
    pub insert_after: Option<String>,
    pub source: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CombinedView {
    Existing(CombinedArticle),
    New(NewArticleView),
}

/// Pair the original article with the amendments that target it.
pub fn compare_before_after(
    decree: &Decree,
    amendments: &[Amendment],
    article_number: &str,
) -> BeforeAfter {
    let original_content = ArticleContent::from(lookup_article(decree, article_number));
    let changes = changes_in_article(amendments, article_number);

    let mut change_types: Vec<String> = Vec::new();
    for change in &changes.changes {
        let label = change
            .amendment_type
            .as_deref()
            .unwrap_or(config::UNKNOWN_AMENDMENT_TYPE);
        if !change_types.iter().any(|t| t == label) {
            change_types.push(label.to_string());
        }
    }

    let analysis = ChangeAnalysis {
        has_changes: changes.total_changes > 0,
        change_types,
        is_new_article: changes
            .changes
            .iter()
            .any(|c| c.target.is_insertion()),
    };

    BeforeAfter {
        article_number: article_number.to_string(),
        original_content,
        changes,
        analysis,
    }
}

/// Build the combined view of an article.
///
/// Existing article: original clauses plus overlay buckets. Missing article:
/// the first matching Addition that carries `insert_after_article` becomes an
/// amendment-only view; without one, the lookup's not-found error is
/// returned unchanged.
pub fn combined_article_view(
    decree: &Decree,
    amendments: &[Amendment],
    article_number: &str,
) -> Result<CombinedView, QueryError> {
    let matched = changes_in_article(amendments, article_number).changes;

    let original = match lookup_article(decree, article_number) {
        Ok(view) => view,
        Err(not_found) => {
            return new_article_view(article_number, &matched)
                .map(CombinedView::New)
                .ok_or(not_found);
        }
    };

    let mut combined = CombinedArticle {
        article_number: original.article_number,
        title: original.title,
        chapter_number: original.chapter_number,
        chapter_title: original.chapter_title,
        clauses: original.clauses,
        modifications: Vec::new(),
        additions: Vec::new(),
        deletions: Vec::new(),
        has_changes: false,
    };

    for change in matched {
        let Some(kind) = change.amendment_type.as_deref().and_then(AmendmentKind::classify) else {
            tracing::debug!(
                article_number,
                amendment_type = ?change.amendment_type,
                "Skipping unclassified amendment in combined view"
            );
            continue;
        };

        match kind {
            AmendmentKind::Addition => combined.additions.push(ContentOverlay {
                clauses: change.clauses,
                text: change.text,
            }),
            AmendmentKind::Modification => combined.modifications.push(ClauseOverlay {
                target_clause: change.target.clause_number,
                clauses: change.clauses,
                text: change.text,
            }),
            AmendmentKind::Deletion => combined.deletions.push(ClauseOverlay {
                target_clause: change.target.clause_number,
                clauses: change.clauses,
                text: change.text,
            }),
        }
    }

    combined.has_changes = !combined.modifications.is_empty()
        || !combined.additions.is_empty()
        || !combined.deletions.is_empty();

    Ok(CombinedView::Existing(combined))
}

fn new_article_view(article_number: &str, matched: &[MatchedAmendment]) -> Option<NewArticleView> {
    let creating = matched.iter().find(|c| {
        c.insert_after_article.is_some()
            && c.amendment_type.as_deref().and_then(AmendmentKind::classify)
                == Some(AmendmentKind::Addition)
    })?;

    Some(NewArticleView {
        article_number: article_number.to_string(),
        is_new_article: true,
        content: creating.clauses.clone(),
        text: creating.text.clone(),
        insert_after: creating.insert_after_article.clone().flatten(),
        source: config::AMENDMENT_ONLY_SOURCE,
    })
}
