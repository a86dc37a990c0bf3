//! Per-amendment analyzer
//!
//! Explains what a single amendment does. Modifications and deletions are
//! paired with the current article content for side-by-side reference.

use serde::Serialize;

use crate::article::{lookup_article, ArticleContent};
use crate::error::{DocumentKind, QueryError};
use crate::model::{Amendment, AmendmentKind, Clause, Decree};
use crate::summary::amendment_at;

/// Payload of an amendment: its text and clauses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmendmentContent {
    pub text: String,
    pub clauses: Vec<Clause>,
}

impl From<&Amendment> for AmendmentContent {
    fn from(amendment: &Amendment) -> Self {
        Self {
            text: amendment.text_or_empty().to_string(),
            clauses: amendment.clauses.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedAmendment {
    pub amendment_index: usize,
    pub amendment_type: Option<String>,
    pub target_article: Option<String>,
    pub target_clause: Option<String>,
    pub is_new_article: bool,
    pub insert_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_content: Option<ArticleContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_content: Option<AmendmentContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_content: Option<AmendmentContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_content: Option<AmendmentContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// One-line description of what an amendment does to an article.
#[must_use]
pub fn describe(kind: AmendmentKind, article_number: Option<&str>) -> String {
    let article = article_number.unwrap_or("(unspecified)");
    match kind {
        AmendmentKind::Addition => format!("New content added to Article {article}"),
        AmendmentKind::Modification => format!("Article {article} content modified"),
        AmendmentKind::Deletion => format!("Content deleted from Article {article}"),
    }
}

/// Analyze the amendment at `index`.
///
/// `decree` is optional: without it, modifications and deletions report the
/// decree-not-loaded error as their original content instead of failing.
pub fn detailed_analysis(
    decree: Option<&Decree>,
    amendments: &[Amendment],
    index: i64,
) -> Result<DetailedAmendment, QueryError> {
    let (index, amendment) = amendment_at(amendments, index)?;
    let kind = amendment.kind();
    let target_article = amendment.target.article_number.as_deref();

    let mut analysis = DetailedAmendment {
        amendment_index: index,
        amendment_type: amendment.amendment_type.clone(),
        target_article: target_article.map(str::to_string),
        target_clause: amendment.target.clause_number.clone(),
        is_new_article: amendment.is_new_article(),
        insert_after: amendment.target.insert_after().map(str::to_string),
        original_content: None,
        added_content: None,
        modified_content: None,
        deleted_content: None,
        summary: None,
    };

    if let (Some(AmendmentKind::Modification | AmendmentKind::Deletion), Some(article_number)) =
        (kind, target_article)
    {
        analysis.original_content = Some(match decree {
            Some(decree) => ArticleContent::from(lookup_article(decree, article_number)),
            None => ArticleContent::Missing(QueryError::NotLoaded(DocumentKind::Decree)),
        });
    }

    let Some(kind) = kind else {
        tracing::debug!(
            index,
            amendment_type = ?amendment.amendment_type,
            "Unclassified amendment"
        );
        return Ok(analysis);
    };

    let content = Some(AmendmentContent::from(amendment));
    match kind {
        AmendmentKind::Addition => analysis.added_content = content,
        AmendmentKind::Modification => analysis.modified_content = content,
        AmendmentKind::Deletion => analysis.deleted_content = content,
    }
    analysis.summary = Some(describe(kind, target_article));

    Ok(analysis)
}
