//! Analysis session
//!
//! Holds the loaded decree and amendment documents and exposes every query
//! operation against them. The two trees sit behind one `RwLock` as `Arc`s:
//!
//! - queries take a shared lock only long enough to clone the `Arc`s, then
//!   compute on the snapshot without holding the lock;
//! - loading replaces a tree under the exclusive lock, so a reload can never
//!   be observed half-way by a concurrent query.
//!
//! Stored trees are never mutated in place, only replaced whole, so a
//! poisoned lock still guards consistent data and is recovered.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde_json::Value;

use crate::analysis::{detailed_analysis, DetailedAmendment};
use crate::article::{lookup_article, ArticleView};
use crate::error::{DocumentKind, EngineError, QueryError};
use crate::matcher::{changes_in_article, search_by_type, ArticleChanges, TypeSearch};
use crate::merge::{combined_article_view, compare_before_after, BeforeAfter, CombinedView};
use crate::model::{AmendmentDocument, DecreeDocument};
use crate::summary::{
    amendment_details, summarize, AmendmentDetail, AmendmentStatistics, ChangeSummary,
};

/// Source of raw document bytes, addressed by an opaque reference.
///
/// Implementations decide what a reference means (a path, a URL, an object
/// store locator). Errors must be able to carry engine load errors so that
/// fetch and parse failures surface through one type.
pub trait DocumentStore {
    type Error: From<EngineError>;

    fn fetch(&self, reference: &str) -> Result<Vec<u8>, Self::Error>;
}

#[derive(Debug, Clone, Default)]
struct Documents {
    decree: Option<Arc<DecreeDocument>>,
    amendments: Option<Arc<AmendmentDocument>>,
}

impl Documents {
    fn decree(&self) -> Result<&DecreeDocument, QueryError> {
        self.decree
            .as_deref()
            .ok_or(QueryError::NotLoaded(DocumentKind::Decree))
    }

    fn amendments(&self) -> Result<&AmendmentDocument, QueryError> {
        self.amendments
            .as_deref()
            .ok_or(QueryError::NotLoaded(DocumentKind::Amendment))
    }
}

/// Title and number of a loaded document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub decree_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amendments: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedFlags {
    pub decree_loaded: bool,
    pub amendment_loaded: bool,
}

/// What the session currently holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentStatus {
    pub documents_loaded: LoadedFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decree_info: Option<DocumentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amendment_info: Option<DocumentInfo>,
}

/// Shared-read, exclusive-write holder of the two source documents.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    documents: RwLock<Documents>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with both documents already in memory.
    pub fn with_documents(decree: DecreeDocument, amendments: AmendmentDocument) -> Self {
        let session = Self::new();
        session.replace(Some(decree), Some(amendments));
        session
    }

    fn snapshot(&self) -> Documents {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, decree: Option<DecreeDocument>, amendments: Option<AmendmentDocument>) {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(decree) = decree {
            documents.decree = Some(Arc::new(decree));
        }
        if let Some(amendments) = amendments {
            documents.amendments = Some(Arc::new(amendments));
        }
    }

    pub fn set_decree(&self, decree: DecreeDocument) {
        self.replace(Some(decree), None);
    }

    pub fn set_amendments(&self, amendments: AmendmentDocument) {
        self.replace(None, Some(amendments));
    }

    /// Fetch and parse a decree, then replace the loaded one.
    pub fn load_decree_from<S: DocumentStore>(
        &self,
        store: &S,
        reference: &str,
    ) -> Result<(), S::Error> {
        tracing::debug!(reference, "Loading decree");
        let decree = DecreeDocument::from_json_slice(&store.fetch(reference)?)?;
        self.set_decree(decree);
        tracing::info!(reference, "Loaded decree");
        Ok(())
    }

    /// Fetch and parse an amendment document, then replace the loaded one.
    pub fn load_amendments_from<S: DocumentStore>(
        &self,
        store: &S,
        reference: &str,
    ) -> Result<(), S::Error> {
        tracing::debug!(reference, "Loading amendments");
        let amendments = AmendmentDocument::from_json_slice(&store.fetch(reference)?)?;
        self.set_amendments(amendments);
        tracing::info!(reference, "Loaded amendments");
        Ok(())
    }

    /// Load both documents. Nothing is replaced unless both load.
    pub fn load_documents_from<S: DocumentStore>(
        &self,
        store: &S,
        decree_reference: &str,
        amendment_reference: &str,
    ) -> Result<(), S::Error> {
        let decree = DecreeDocument::from_json_slice(&store.fetch(decree_reference)?)?;
        let amendments = AmendmentDocument::from_json_slice(&store.fetch(amendment_reference)?)?;
        self.replace(Some(decree), Some(amendments));
        tracing::info!(
            decree = decree_reference,
            amendments = amendment_reference,
            "Loaded legal documents"
        );
        Ok(())
    }

    pub fn decree(&self) -> Option<Arc<DecreeDocument>> {
        self.snapshot().decree
    }

    pub fn amendments(&self) -> Option<Arc<AmendmentDocument>> {
        self.snapshot().amendments
    }

    /// Both documents taken from one snapshot, so the pair always comes
    /// from the same load.
    pub fn documents(&self) -> (Option<Arc<DecreeDocument>>, Option<Arc<AmendmentDocument>>) {
        let Documents { decree, amendments } = self.snapshot();
        (decree, amendments)
    }

    pub fn changes_in_article(&self, article_number: &str) -> Result<ArticleChanges, QueryError> {
        let docs = self.snapshot();
        Ok(changes_in_article(&docs.amendments()?.amendments, article_number))
    }

    pub fn summarize_all(&self) -> Result<ChangeSummary, QueryError> {
        let docs = self.snapshot();
        Ok(summarize(&docs.amendments()?.amendments))
    }

    pub fn statistics(&self) -> Result<AmendmentStatistics, QueryError> {
        self.summarize_all().map(AmendmentStatistics::from)
    }

    pub fn article_content(&self, article_number: &str) -> Result<ArticleView, QueryError> {
        let docs = self.snapshot();
        lookup_article(&docs.decree()?.decree, article_number)
    }

    pub fn compare_before_after(&self, article_number: &str) -> Result<BeforeAfter, QueryError> {
        let docs = self.snapshot();
        let decree = docs.decree()?;
        let amendments = docs.amendments()?;
        Ok(compare_before_after(&decree.decree, &amendments.amendments, article_number))
    }

    pub fn amendment_details(&self, index: i64) -> Result<AmendmentDetail, QueryError> {
        let docs = self.snapshot();
        amendment_details(&docs.amendments()?.amendments, index)
    }

    pub fn search_by_type(&self, amendment_type: &str) -> Result<TypeSearch, QueryError> {
        let docs = self.snapshot();
        Ok(search_by_type(&docs.amendments()?.amendments, amendment_type))
    }

    pub fn detailed_amendment_analysis(&self, index: i64) -> Result<DetailedAmendment, QueryError> {
        let docs = self.snapshot();
        let amendments = docs.amendments()?;
        let decree = docs.decree.as_deref().map(|d| &d.decree);
        detailed_analysis(decree, &amendments.amendments, index)
    }

    pub fn combined_article_view(&self, article_number: &str) -> Result<CombinedView, QueryError> {
        let docs = self.snapshot();
        let decree = docs.decree()?;
        let amendments = docs.amendments()?;
        combined_article_view(&decree.decree, &amendments.amendments, article_number)
    }

    pub fn status(&self) -> DocumentStatus {
        let docs = self.snapshot();
        DocumentStatus {
            documents_loaded: LoadedFlags {
                decree_loaded: docs.decree.is_some(),
                amendment_loaded: docs.amendments.is_some(),
            },
            decree_info: docs.decree.as_deref().map(|d| DocumentInfo {
                title: d.metadata.title.clone(),
                decree_number: d.metadata.decree_number.clone(),
                total_amendments: None,
            }),
            amendment_info: docs.amendments.as_deref().map(|a| DocumentInfo {
                title: a.metadata.title.clone(),
                decree_number: a.metadata.decree_number.clone(),
                total_amendments: Some(a.amendments.len()),
            }),
        }
    }
}

/// Render a query outcome as the JSON object handed to consumers: the
/// result itself on success, the `{"error": ...}` object otherwise.
pub fn to_response<T: Serialize>(result: &Result<T, QueryError>) -> serde_json::Result<Value> {
    match result {
        Ok(value) => serde_json::to_value(value),
        Err(err) => serde_json::to_value(err),
    }
}
