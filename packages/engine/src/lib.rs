//! Amendment Engine
//!
//! Answers structured questions about how an amendment document changes a
//! base decree. Both documents are JSON trees (decree → chapters → articles
//! → clauses; amendment list → target + payload).
//!
//! This library provides:
//! - Article lookup with chapter context ([`article`])
//! - Matching amendments by target article or by type ([`matcher`])
//! - Corpus-wide statistics and per-amendment records ([`summary`])
//! - Before/after comparisons and combined article views ([`merge`])
//! - Detailed analysis of a single amendment ([`analysis`])
//! - A session holding loaded documents for concurrent queries ([`session`])
//!
//! All query functions are pure and never mutate the source trees.
//!
//! # Example
//!
//! ```
//! use amendment_engine::{combined_article_view, AmendmentDocument, CombinedView, DecreeDocument};
//!
//! let decree = DecreeDocument::from_json_str(r#"{"Decree": {"chapters": [{"articles": [
//!     {"article_number": "7", "clauses": [{"clause_number": "1"}]}]}]}}"#).unwrap();
//! let amendments = AmendmentDocument::from_json_str(r#"{"amendments": [
//!     {"amendment_type": "Deletion", "target": {"article_number": "7", "clause_number": "1"}}]}"#).unwrap();
//!
//! let view = combined_article_view(&decree.decree, &amendments.amendments, "7").unwrap();
//! let CombinedView::Existing(article) = view else { unreachable!() };
//! assert_eq!(article.deletions.len(), 1);
//! assert!(article.has_changes);
//! ```

pub mod analysis;
pub mod article;
pub mod config;
pub mod error;
pub mod matcher;
pub mod merge;
pub mod model;
pub mod session;
pub mod summary;

// Re-export commonly used items
pub use analysis::{detailed_analysis, AmendmentContent, DetailedAmendment};
pub use article::{lookup_article, ArticleContent, ArticleView};
pub use error::{DocumentKind, EngineError, QueryError, Result};
pub use matcher::{
    changes_in_article, match_by_article, match_by_type, search_by_type, ArticleChanges,
    MatchedAmendment, TypeMatch, TypeSearch,
};
pub use merge::{
    combined_article_view, compare_before_after, BeforeAfter, ChangeAnalysis, ClauseOverlay,
    CombinedArticle, CombinedView, ContentOverlay, NewArticleView,
};
pub use model::{
    Amendment, AmendmentDocument, AmendmentKind, Article, Chapter, Clause, Decree, DecreeDocument,
    DocumentMetadata, Target,
};
pub use session::{to_response, AnalysisSession, DocumentStatus, DocumentStore};
pub use summary::{
    amendment_details, summarize, AmendmentDetail, AmendmentStatistics, ChangeRecord,
    ChangeSummary, SummaryStats,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
