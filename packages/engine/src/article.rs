//! Article index
//!
//! Resolves an article number to its content and enclosing chapter. Lookup
//! is a linear scan in document order and compares article numbers
//! byte-for-byte: "7" does not match "07", "12A" does not match "12a".

use serde::Serialize;

use crate::error::QueryError;
use crate::model::{Clause, Decree};

/// An article as found in the decree, with its chapter context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleView {
    pub article_number: String,
    pub title: Option<String>,
    pub clauses: Vec<Clause>,
    pub chapter_number: Option<String>,
    pub chapter_title: Option<String>,
}

/// Result of a lookup as it is reported to consumers: the article, or the
/// error object explaining why there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArticleContent {
    Found(ArticleView),
    Missing(QueryError),
}

impl ArticleContent {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn as_view(&self) -> Option<&ArticleView> {
        match self {
            Self::Found(view) => Some(view),
            Self::Missing(_) => None,
        }
    }
}

impl From<Result<ArticleView, QueryError>> for ArticleContent {
    fn from(result: Result<ArticleView, QueryError>) -> Self {
        match result {
            Ok(view) => Self::Found(view),
            Err(err) => Self::Missing(err),
        }
    }
}

/// Find an article by exact article number.
///
/// Chapters are scanned in document order, then articles in chapter order;
/// the first match wins. The returned clauses are a deep copy, so callers
/// may mutate them freely.
pub fn lookup_article(decree: &Decree, article_number: &str) -> Result<ArticleView, QueryError> {
    tracing::debug!(article_number, "Looking up article");

    decree
        .articles()
        .find(|(_, article)| article.article_number.as_deref() == Some(article_number))
        .map(|(chapter, article)| ArticleView {
            article_number: article_number.to_string(),
            title: article.article_title.clone(),
            clauses: article.clauses.clone(),
            chapter_number: chapter.chapter_number.clone(),
            chapter_title: chapter.chapter_title.clone(),
        })
        .ok_or_else(|| QueryError::article_not_found(article_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Article, Chapter};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn article(number: &str, title: &str) -> Article {
        Article {
            article_number: Some(number.to_string()),
            article_title: Some(title.to_string()),
            clauses: vec![json!({"clause_number": "1", "text": format!("{title} clause")})],
        }
    }

    fn decree() -> Decree {
        Decree {
            chapters: vec![
                Chapter {
                    chapter_number: Some("I".to_string()),
                    chapter_title: Some("General provisions".to_string()),
                    articles: vec![article("1", "Scope"), article("2", "Definitions")],
                },
                Chapter {
                    chapter_number: Some("II".to_string()),
                    chapter_title: Some("Procedures".to_string()),
                    articles: vec![article("12", "Dossiers"), article("2", "Duplicate")],
                },
            ],
        }
    }

    #[test]
    fn test_lookup_returns_chapter_context() {
        let view = lookup_article(&decree(), "12").unwrap();
        assert_eq!(view.article_number, "12");
        assert_eq!(view.title.as_deref(), Some("Dossiers"));
        assert_eq!(view.chapter_number.as_deref(), Some("II"));
        assert_eq!(view.chapter_title.as_deref(), Some("Procedures"));
        assert_eq!(view.clauses.len(), 1);
    }

    #[test]
    fn test_lookup_first_match_wins() {
        let view = lookup_article(&decree(), "2").unwrap();
        assert_eq!(view.title.as_deref(), Some("Definitions"));
        assert_eq!(view.chapter_number.as_deref(), Some("I"));
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let decree = decree();
        assert!(lookup_article(&decree, "01").is_err());
        assert!(lookup_article(&decree, " 1").is_err());
        assert!(lookup_article(&decree, "1 ").is_err());
        assert!(lookup_article(&decree, "Ⅰ").is_err());

        let mut decree = decree;
        decree.chapters[0].articles.push(article("12a", "Lowercase"));
        assert!(lookup_article(&decree, "12A").is_err());
        assert!(lookup_article(&decree, "12a").is_ok());
    }

    #[test]
    fn test_lookup_not_found_carries_query() {
        let err = lookup_article(&decree(), "99").unwrap_err();
        assert_eq!(err, QueryError::article_not_found("99"));
        assert_eq!(
            serde_json::to_value(ArticleContent::from(Err(err))).unwrap(),
            json!({"error": "Article 99 not found", "article_number": "99"})
        );
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let decree = decree();
        let first = lookup_article(&decree, "1");
        let second = lookup_article(&decree, "1");
        assert_eq!(first, second);

        let missing_first = lookup_article(&decree, "x");
        let missing_second = lookup_article(&decree, "x");
        assert_eq!(missing_first, missing_second);
    }

    #[test]
    fn test_mutating_view_does_not_touch_decree() {
        let decree = decree();
        let mut view = lookup_article(&decree, "1").unwrap();
        view.clauses.clear();
        view.clauses.push(json!("replaced"));

        let again = lookup_article(&decree, "1").unwrap();
        assert_eq!(again.clauses.len(), 1);
        assert_eq!(again.clauses[0]["text"], "Scope clause");
    }

    #[test]
    fn test_view_serializes_null_title() {
        let decree = Decree {
            chapters: vec![Chapter {
                chapter_number: None,
                chapter_title: None,
                articles: vec![Article {
                    article_number: Some("3".to_string()),
                    article_title: None,
                    clauses: vec![],
                }],
            }],
        };
        let value = serde_json::to_value(lookup_article(&decree, "3").unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "article_number": "3",
                "title": null,
                "clauses": [],
                "chapter_number": null,
                "chapter_title": null
            })
        );
    }
}
