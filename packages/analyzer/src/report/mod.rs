//! Analysis reports.
//!
//! A report is rendered to Markdown from the loaded session, published
//! through a [`ReportPublisher`], and summarized in a [`ReportResponse`]
//! carrying the access link.

mod publish;
mod render;

use std::collections::BTreeMap;
use std::fmt;

use amendment_engine::{
    changes_in_article, lookup_article, summarize, AnalysisSession, DocumentKind, QueryError,
};
use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

use crate::config::REPORT_LINK_EXPIRY;
use crate::error::Result;

pub use publish::{report_key, LocalPublisher, PublishedReport, ReportPublisher};
pub use render::{recommendations, render_report, ArticleDigest, ReportInput, PAGE_BREAK};

/// Number of affected articles listed in the response summary.
const MOST_AFFECTED_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Executive,
    Detailed,
    #[default]
    Comprehensive,
}

impl ReportType {
    /// Parse a report type name. Unknown names fall back to comprehensive.
    ///
    /// # Examples
    /// ```
    /// use amendment_analyzer::report::ReportType;
    ///
    /// assert_eq!(ReportType::from_name("Executive"), ReportType::Executive);
    /// assert_eq!(ReportType::from_name("quarterly"), ReportType::Comprehensive);
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "executive" => Self::Executive,
            "detailed" => Self::Detailed,
            "comprehensive" => Self::Comprehensive,
            other => {
                tracing::debug!(report_type = other, "Unknown report type, using comprehensive");
                Self::Comprehensive
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executive => "executive",
            Self::Detailed => "detailed",
            Self::Comprehensive => "comprehensive",
        }
    }

    pub(crate) fn subtitle(&self) -> &'static str {
        match self {
            Self::Executive => "Executive Summary",
            Self::Detailed => "Detailed Analysis",
            Self::Comprehensive => "Comprehensive Analysis",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub total_amendments: usize,
    pub articles_affected: usize,
    pub new_articles_added: usize,
    pub amendment_types: BTreeMap<String, usize>,
    pub most_affected_articles: Vec<String>,
    pub new_articles: Vec<String>,
}

/// Titles and numbers of both documents, `"N/A"` where absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocumentInfo {
    pub decree_title: String,
    pub amendment_title: String,
    pub decree_number: String,
    pub amendment_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDetails {
    pub report_type: ReportType,
    pub report_url: String,
    pub storage_key: String,
    pub expires_in: &'static str,
    pub generated_at: DateTime<Local>,
    pub status: &'static str,
}

/// Short summary returned after a report is published.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportResponse {
    pub analysis_summary: AnalysisSummary,
    pub document_info: ReportDocumentInfo,
    pub report_details: ReportDetails,
}

/// Gather report input from the session. Requires the amendment document;
/// the decree only contributes metadata and article titles when loaded.
pub fn collect_input(session: &AnalysisSession) -> std::result::Result<ReportInput, QueryError> {
    let (decree, amendments) = session.documents();
    let amendments = amendments.ok_or(QueryError::NotLoaded(DocumentKind::Amendment))?;
    let summary = summarize(&amendments.amendments);

    let articles = summary
        .summary
        .affected_articles
        .iter()
        .take(MOST_AFFECTED_LIMIT)
        .map(|number| {
            let view = decree
                .as_deref()
                .and_then(|d| lookup_article(&d.decree, number).ok());
            let total_changes = changes_in_article(&amendments.amendments, number).total_changes;
            ArticleDigest {
                article_number: number.clone(),
                in_decree: view.is_some(),
                title: view.as_ref().and_then(|v| v.title.clone()),
                chapter_number: view.as_ref().and_then(|v| v.chapter_number.clone()),
                chapter_title: view.and_then(|v| v.chapter_title),
                total_changes,
            }
        })
        .collect();

    Ok(ReportInput {
        decree: decree.map(|d| d.metadata.clone()),
        amendment: Some(amendments.metadata.clone()),
        summary,
        articles,
    })
}

/// Render, publish and summarize a report.
pub fn generate_report<P: ReportPublisher>(
    session: &AnalysisSession,
    publisher: &P,
    report_type: ReportType,
) -> Result<ReportResponse> {
    let input = collect_input(session)?;
    let generated_at = Local::now();
    let key = report_key(&generated_at, Uuid::new_v4());

    let content = render_report(report_type, &input, &generated_at.to_rfc3339());
    let published = publisher.publish(&key, content.as_bytes())?;

    let stats = &input.summary.summary;
    let na = |value: Option<&String>| value.cloned().unwrap_or_else(|| "N/A".to_string());
    let decree = input.decree.as_ref();
    let amendment = input.amendment.as_ref();

    Ok(ReportResponse {
        analysis_summary: AnalysisSummary {
            total_amendments: stats.total_amendments,
            articles_affected: stats.articles_affected,
            new_articles_added: stats.new_articles_added,
            amendment_types: stats.amendment_types.clone(),
            most_affected_articles: stats
                .affected_articles
                .iter()
                .take(MOST_AFFECTED_LIMIT)
                .cloned()
                .collect(),
            new_articles: stats.new_articles.clone(),
        },
        document_info: ReportDocumentInfo {
            decree_title: na(decree.and_then(|m| m.title.as_ref())),
            amendment_title: na(amendment.and_then(|m| m.title.as_ref())),
            decree_number: na(decree.and_then(|m| m.decree_number.as_ref())),
            amendment_number: na(amendment.and_then(|m| m.decree_number.as_ref())),
        },
        report_details: ReportDetails {
            report_type,
            report_url: published.url,
            storage_key: published.storage_key,
            expires_in: REPORT_LINK_EXPIRY,
            generated_at,
            status: "success",
        },
    })
}
