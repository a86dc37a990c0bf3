//! End-to-end tests for amendment analysis.
//!
//! Runs every query operation against a decree / amendment fixture pair
//! modelled on a real amending decree.

use std::fs;
use std::path::Path;

use amendment_engine::{
    lookup_article, summarize, to_response, AmendmentDocument, AnalysisSession, CombinedView,
    DecreeDocument, QueryError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn load_documents() -> (DecreeDocument, AmendmentDocument) {
    let decree = DecreeDocument::from_json_str(&load_fixture("decree.json"))
        .expect("Failed to parse decree fixture");
    let amendments = AmendmentDocument::from_json_str(&load_fixture("amendments.json"))
        .expect("Failed to parse amendment fixture");
    (decree, amendments)
}

fn session() -> AnalysisSession {
    let (decree, amendments) = load_documents();
    AnalysisSession::with_documents(decree, amendments)
}

#[test]
fn test_fixture_metadata() {
    let (decree, amendments) = load_documents();
    assert_eq!(decree.metadata.decree_number.as_deref(), Some("118/2021/ND-CP"));
    assert_eq!(decree.metadata.page_count.as_deref(), Some("42"));
    assert_eq!(decree.decree.article_count(), 5);
    assert_eq!(amendments.amendments.len(), 6);
}

#[test]
fn test_changes_in_article_7() {
    let changes = session().changes_in_article("7").unwrap();
    assert_eq!(changes.total_changes, 2);
    assert_eq!(changes.changes[0].amendment_type.as_deref(), Some("Modification"));
    assert_eq!(changes.changes[1].amendment_type.as_deref(), Some("Addition"));
}

#[test]
fn test_combined_view_article_7() {
    let view = session().combined_article_view("7").unwrap();
    let CombinedView::Existing(article) = view else {
        panic!("article 7 exists in the decree");
    };

    assert!(article.has_changes);
    assert_eq!(article.modifications.len(), 1);
    assert_eq!(article.modifications[0].target_clause.as_deref(), Some("1"));
    assert_eq!(article.additions.len(), 1);
    assert!(article.deletions.is_empty());
    assert_eq!(article.chapter_number.as_deref(), Some("II"));
    assert_eq!(
        article.clauses[0]["text"],
        "Dossiers are submitted in person.",
        "original clauses must not reflect the modification"
    );
}

#[test]
fn test_combined_view_numeric_clause_target() {
    let view = session().combined_article_view("12").unwrap();
    let CombinedView::Existing(article) = view else {
        panic!("article 12 exists in the decree");
    };
    assert_eq!(article.modifications[0].target_clause.as_deref(), Some("1"));
    assert_eq!(article.clauses[0]["points"][1]["point"], "b");
}

#[test]
fn test_combined_view_new_article_12a() {
    let value = to_response(&session().combined_article_view("12a")).unwrap();
    assert_eq!(value["is_new_article"], json!(true));
    assert_eq!(value["source"], "amendment_only");
    assert_eq!(value["insert_after"], "12");
    assert_eq!(value["content"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_combined_view_missing_article_equals_article_content() {
    let session = session();
    for article_number in ["99", "7a", "07", ""] {
        let combined = to_response(&session.combined_article_view(article_number)).unwrap();
        let content = to_response(&session.article_content(article_number)).unwrap();
        assert_eq!(combined, content);
        assert_eq!(content["error"], format!("Article {article_number} not found"));
    }
}

#[test]
fn test_compare_before_after_article_2() {
    let result = session().compare_before_after("2").unwrap();
    assert_eq!(result.analysis.change_types, vec!["Deletion"]);
    assert!(result.analysis.has_changes);
    assert!(!result.analysis.is_new_article);
    assert_eq!(result.original_content.as_view().map(|v| v.clauses.len()), Some(2));
}

#[test]
fn test_summary_over_fixture() {
    let summary = session().summarize_all().unwrap();
    let value = serde_json::to_value(&summary.summary).unwrap();
    assert_eq!(
        value,
        json!({
            "total_amendments": 6,
            "amendment_types": {"Addition": 2, "Deletion": 1, "Modification": 2, "Renumbering": 1},
            "articles_affected": 5,
            "affected_articles": ["12", "12a", "13", "2", "7"],
            "new_articles_added": 1,
            "new_articles": ["12a"]
        })
    );
    assert_eq!(summary.detailed_changes.len(), 6);
}

#[test]
fn test_affected_articles_sorted_for_shuffled_input() {
    let (_, mut amendments) = load_documents();
    let duplicated = amendments.amendments.clone();
    amendments.amendments.extend(duplicated);
    amendments.amendments.rotate_left(3);

    let affected = summarize(&amendments.amendments).summary.affected_articles;
    let mut expected = affected.clone();
    expected.sort();
    expected.dedup();
    assert_eq!(affected, expected);
}

#[test]
fn test_amendment_details_bounds() {
    let session = session();
    assert_eq!(
        session.amendment_details(-1).unwrap_err(),
        QueryError::IndexOutOfRange { index: -1, total: 6 }
    );
    assert_eq!(
        session.amendment_details(6).unwrap_err(),
        QueryError::IndexOutOfRange { index: 6, total: 6 }
    );
    assert_eq!(session.amendment_details(5).unwrap().index, 5);

    let empty =
        AnalysisSession::with_documents(DecreeDocument::default(), AmendmentDocument::default());
    assert_eq!(
        empty.amendment_details(0).unwrap_err(),
        QueryError::IndexOutOfRange { index: 0, total: 0 }
    );
}

#[test]
fn test_search_by_type_case_insensitive() {
    let session = session();
    let lower = session.search_by_type("addition").unwrap();
    let title = session.search_by_type("Addition").unwrap();
    assert_eq!(lower.matches, title.matches);
    assert_eq!(lower.total_matches, 2);
    let indices: Vec<usize> = lower.matches.iter().map(|m| m.index).collect();
    assert_eq!(indices, vec![1, 2]);
}

#[test]
fn test_detailed_analysis_per_type() {
    let session = session();

    let modification = to_response(&session.detailed_amendment_analysis(0)).unwrap();
    assert_eq!(modification["summary"], "Article 7 content modified");
    assert_eq!(modification["original_content"]["title"], "Submission of dossiers");
    assert!(modification.get("modified_content").is_some());

    let addition = to_response(&session.detailed_amendment_analysis(2)).unwrap();
    assert_eq!(addition["summary"], "New content added to Article 12a");
    assert_eq!(addition["is_new_article"], json!(true));
    assert!(addition.get("original_content").is_none());

    let deletion = to_response(&session.detailed_amendment_analysis(3)).unwrap();
    assert_eq!(deletion["summary"], "Content deleted from Article 2");
    assert_eq!(deletion["deleted_content"]["text"], "Clause 2 is annulled.");

    let renumbering = to_response(&session.detailed_amendment_analysis(5)).unwrap();
    assert!(renumbering.get("summary").is_none());
}

#[test]
fn test_lookup_is_repeatable() {
    let (decree, _) = load_documents();
    let first = lookup_article(&decree.decree, "12");
    let second = lookup_article(&decree.decree, "12");
    assert_eq!(first, second);
}
