//! Markdown rendering of analysis reports.

use amendment_engine::{AmendmentKind, ChangeSummary, DocumentMetadata, SummaryStats};
use textwrap::{fill, Options};

use super::ReportType;
use crate::config::TEXT_WRAP_WIDTH;

/// Line separating report pages (ASCII form feed).
pub const PAGE_BREAK: &str = "\u{000C}";

const NOT_AVAILABLE: &str = "N/A";

/// How many affected articles the impact and article sections list.
const MAX_LISTED_ARTICLES: usize = 5;

/// How many amendments the detailed section lists.
const MAX_LISTED_AMENDMENTS: usize = 10;

const TABLE_OF_CONTENTS: [&str; 7] = [
    "Document Information",
    "Key Findings",
    "Impact Assessment",
    "Detailed Amendment Analysis",
    "Article-by-Article Analysis",
    "Recommendations",
    "Appendix",
];

/// What the article-by-article section shows for one affected article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDigest {
    pub article_number: String,
    /// False for articles only the amendments introduce.
    pub in_decree: bool,
    pub title: Option<String>,
    pub chapter_number: Option<String>,
    pub chapter_title: Option<String>,
    pub total_changes: usize,
}

/// Everything a report is rendered from.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub decree: Option<DocumentMetadata>,
    pub amendment: Option<DocumentMetadata>,
    pub summary: ChangeSummary,
    pub articles: Vec<ArticleDigest>,
}

/// Recommendations derived from amendment type counts and new articles.
pub fn recommendations(stats: &SummaryStats) -> Vec<String> {
    let count = |kind: AmendmentKind| {
        stats
            .amendment_types
            .get(kind.as_str())
            .copied()
            .unwrap_or(0)
    };
    let mut items = Vec::new();

    if count(AmendmentKind::Addition) > 0 {
        items.push(
            "Review new additions for compliance requirements and implementation timeline"
                .to_string(),
        );
    }
    if count(AmendmentKind::Modification) > 0 {
        items.push("Update existing procedures and policies based on modifications".to_string());
    }
    if count(AmendmentKind::Deletion) > 0 {
        items.push("Remove obsolete procedures and update related documentation".to_string());
    }
    if !stats.new_articles.is_empty() {
        items.push(format!(
            "Implement new articles: {} with proper training and documentation",
            stats.new_articles.join(", ")
        ));
    }
    items.push("Conduct impact assessment on affected business processes".to_string());
    items.push("Update legal compliance documentation and procedures".to_string());
    items
}

/// Render a report of the given type as Markdown.
pub fn render_report(report_type: ReportType, input: &ReportInput, generated_at: &str) -> String {
    let mut doc = MarkdownDoc::default();
    doc.heading(1, "Legal Amendment Analysis Report");
    doc.heading(2, report_type.subtitle());
    doc.paragraph(&format!("Generated at {generated_at}"));

    match report_type {
        ReportType::Executive => {
            document_information(&mut doc, input);
            key_findings(&mut doc, &input.summary.summary);
            impact_assessment(&mut doc, &input.summary.summary);
        }
        ReportType::Detailed => {
            document_information(&mut doc, input);
            key_findings(&mut doc, &input.summary.summary);
            detailed_amendments(&mut doc, &input.summary);
            article_analysis(&mut doc, &input.articles);
        }
        ReportType::Comprehensive => {
            doc.heading(2, "Table of Contents");
            for (i, item) in TABLE_OF_CONTENTS.iter().enumerate() {
                doc.line(&format!("{}. {item}", i + 1));
            }
            doc.page_break();

            document_information(&mut doc, input);
            key_findings(&mut doc, &input.summary.summary);
            impact_assessment(&mut doc, &input.summary.summary);
            doc.page_break();

            detailed_amendments(&mut doc, &input.summary);
            article_analysis(&mut doc, &input.articles);
            doc.page_break();

            recommendations_section(&mut doc, &input.summary.summary);
            appendix(&mut doc, &input.summary);
        }
    }

    doc.finish()
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

fn document_information(doc: &mut MarkdownDoc, input: &ReportInput) {
    let decree = input.decree.as_ref();
    let amendment = input.amendment.as_ref();
    let title =
        |m: Option<&DocumentMetadata>| or_na(m.and_then(|m| m.title.as_deref())).to_string();
    let number = |m: Option<&DocumentMetadata>| {
        or_na(m.and_then(|m| m.decree_number.as_deref())).to_string()
    };
    let date = |m: Option<&DocumentMetadata>| or_na(m.and_then(|m| m.date.as_deref())).to_string();
    let pages =
        |m: Option<&DocumentMetadata>| or_na(m.and_then(|m| m.page_count.as_deref())).to_string();

    doc.heading(3, "Document Information");
    doc.table(
        &["Field", "Decree", "Amendment"],
        &[
            vec!["Title".to_string(), title(decree), title(amendment)],
            vec!["Document Number".to_string(), number(decree), number(amendment)],
            vec!["Date".to_string(), date(decree), date(amendment)],
            vec!["Page Count".to_string(), pages(decree), pages(amendment)],
        ],
    );
}

fn key_findings(doc: &mut MarkdownDoc, stats: &SummaryStats) {
    let types = stats
        .amendment_types
        .iter()
        .map(|(label, count)| format!("{label}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");

    doc.heading(3, "Key Findings");
    doc.table(
        &["Metric", "Value"],
        &[
            vec!["Total Amendments".to_string(), stats.total_amendments.to_string()],
            vec!["Articles Affected".to_string(), stats.articles_affected.to_string()],
            vec!["New Articles Added".to_string(), stats.new_articles_added.to_string()],
            vec!["Amendment Types".to_string(), types],
        ],
    );
}

fn impact_assessment(doc: &mut MarkdownDoc, stats: &SummaryStats) {
    doc.heading(3, "Impact Assessment");
    doc.line("Most Affected Articles:");
    for article in stats.affected_articles.iter().take(MAX_LISTED_ARTICLES) {
        doc.bullet(&format!("Article {article}"));
    }
    doc.blank();

    if !stats.new_articles.is_empty() {
        doc.line("New Articles Added:");
        for article in &stats.new_articles {
            doc.bullet(&format!("Article {article}"));
        }
        doc.blank();
    }
}

fn detailed_amendments(doc: &mut MarkdownDoc, summary: &ChangeSummary) {
    doc.heading(3, "Detailed Amendment Analysis");
    for (i, change) in summary.detailed_changes.iter().take(MAX_LISTED_AMENDMENTS).enumerate() {
        doc.line(&format!(
            "**Amendment {}: {}**",
            i + 1,
            change.amendment_type.as_deref().unwrap_or("Unknown")
        ));
        doc.bullet(&format!("Target Article: {}", or_na(change.target_article.as_deref())));
        if let Some(clause) = change.target_clause.as_deref().filter(|c| !c.is_empty()) {
            doc.bullet(&format!("Target Clause: {clause}"));
        }
        if let Some(after) = change.insert_after.as_deref() {
            doc.bullet(&format!("Inserted after Article {after}"));
        }
        doc.blank();
    }
    if summary.detailed_changes.len() > MAX_LISTED_AMENDMENTS {
        doc.paragraph(&format!(
            "{} further amendments are not listed.",
            summary.detailed_changes.len() - MAX_LISTED_AMENDMENTS
        ));
    }
}

fn article_analysis(doc: &mut MarkdownDoc, articles: &[ArticleDigest]) {
    doc.heading(3, "Article-by-Article Analysis");
    for article in articles.iter().take(MAX_LISTED_ARTICLES) {
        doc.line(&format!("**Article {}**", article.article_number));
        if article.in_decree {
            doc.bullet(&format!("Title: {}", or_na(article.title.as_deref())));
            doc.bullet(&format!(
                "Chapter: {} - {}",
                or_na(article.chapter_number.as_deref()),
                or_na(article.chapter_title.as_deref())
            ));
        } else {
            doc.bullet("Not present in the base decree");
        }
        doc.bullet(&format!("Changes: {}", article.total_changes));
        doc.blank();
    }
}

fn recommendations_section(doc: &mut MarkdownDoc, stats: &SummaryStats) {
    doc.heading(3, "Recommendations");
    for (i, item) in recommendations(stats).iter().enumerate() {
        doc.line(&format!("{}. {item}", i + 1));
    }
    doc.blank();
}

fn appendix(doc: &mut MarkdownDoc, summary: &ChangeSummary) {
    doc.heading(3, "Appendix");
    doc.paragraph("Detailed amendment data, one row per amendment in document order.");
    let rows: Vec<Vec<String>> = summary
        .detailed_changes
        .iter()
        .enumerate()
        .map(|(i, c)| {
            vec![
                i.to_string(),
                c.amendment_type.clone().unwrap_or_else(|| "Unknown".to_string()),
                or_na(c.target_article.as_deref()).to_string(),
                or_na(c.target_clause.as_deref()).to_string(),
                c.clause_count.to_string(),
            ]
        })
        .collect();
    doc.table(&["Index", "Type", "Article", "Clause", "Clauses"], &rows);
}

/// Minimal Markdown writer.
#[derive(Debug, Default)]
struct MarkdownDoc {
    lines: Vec<String>,
}

impl MarkdownDoc {
    fn heading(&mut self, level: usize, text: &str) {
        self.lines.push(format!("{} {text}", "#".repeat(level)));
        self.blank();
    }

    fn paragraph(&mut self, text: &str) {
        self.lines.push(fill(text, Options::new(TEXT_WRAP_WIDTH)));
        self.blank();
    }

    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn bullet(&mut self, text: &str) {
        let options = Options::new(TEXT_WRAP_WIDTH)
            .initial_indent("- ")
            .subsequent_indent("  ");
        self.lines.push(fill(text, options));
    }

    fn table(&mut self, headers: &[&str], rows: &[Vec<String>]) {
        self.lines.push(table_row(headers.iter().map(|h| escape_cell(h))));
        self.lines.push(table_row(headers.iter().map(|_| "---".to_string())));
        for cells in rows {
            self.lines.push(table_row(cells.iter().map(|c| escape_cell(c))));
        }
        self.blank();
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn page_break(&mut self) {
        self.blank();
        self.lines.push(PAGE_BREAK.to_string());
        self.blank();
    }

    fn finish(mut self) -> String {
        while self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

fn table_row(cells: impl Iterator<Item = String>) -> String {
    format!("| {} |", cells.collect::<Vec<_>>().join(" | "))
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
