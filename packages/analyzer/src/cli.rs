//! Command-line interface for the analyzer.

use std::path::PathBuf;

use amendment_engine::{to_response, AnalysisSession, QueryError};
use clap::{Parser, Subcommand};
use console::style;
use serde::Serialize;

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::report::{generate_report, LocalPublisher, ReportType};
use crate::store::{document_status, load_default_documents};

/// Amendment Analyzer - Analyze how an amending decree changes a base decree.
#[derive(Parser)]
#[command(name = "amendment-analyzer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Decree reference: local path, http(s) URL or s3://bucket/key
    #[arg(long, global = true)]
    pub decree: Option<String>,

    /// Amendment document reference
    #[arg(long, global = true)]
    pub amendments: Option<String>,

    /// Directory reports are written to
    #[arg(long, global = true)]
    pub report_dir: Option<PathBuf>,

    /// Public base URL for report links
    #[arg(long, global = true)]
    pub report_base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show which documents load and where they come from.
    Status,

    /// List every amendment targeting an article.
    Changes { article: String },

    /// Summarize all amendments.
    Summary,

    /// Amendment statistics with a per-amendment breakdown.
    Statistics,

    /// Show an article of the base decree.
    Article { article: String },

    /// Compare an article before and after amendment.
    Compare { article: String },

    /// Show one amendment by 0-based index.
    Amendment {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },

    /// Find amendments by type (case-insensitive).
    Search { amendment_type: String },

    /// Detailed analysis of one amendment by 0-based index.
    Analyze {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },

    /// Article with its modifications, additions and deletions side by side.
    Combined { article: String },

    /// Generate and publish an analysis report.
    Report {
        /// executive, detailed or comprehensive
        #[arg(short = 't', long = "type", default_value = "comprehensive")]
        report_type: String,
    },
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> Result<AnalyzerConfig> {
        let mut config = AnalyzerConfig::from_env()?;
        if let Some(decree) = &self.decree {
            config.decree_ref = decree.clone();
        }
        if let Some(amendments) = &self.amendments {
            config.amendments_ref = amendments.clone();
        }
        if let Some(dir) = &self.report_dir {
            config = config.with_report_dir(dir.clone());
        }
        if let Some(base_url) = &self.report_base_url {
            config = config.with_report_base_url(base_url.clone())?;
        }
        Ok(config)
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;
    execute(&cli.command, &config)
}

/// Execute one command against freshly loaded documents.
///
/// `status` reports load failures instead of failing; every other command
/// needs both documents.
pub fn execute(command: &Commands, config: &AnalyzerConfig) -> Result<()> {
    let session = AnalysisSession::new();

    match command {
        Commands::Status => {
            if let Err(e) = load_default_documents(&session, config) {
                tracing::warn!(error = %e, "Documents could not be loaded");
                eprintln!("{} {e}", style("Not loaded:").yellow().bold());
            }
        }
        _ => load_default_documents(&session, config)?,
    }

    run_command(command, &session, config)
}

fn run_command(
    command: &Commands,
    session: &AnalysisSession,
    config: &AnalyzerConfig,
) -> Result<()> {
    match command {
        Commands::Status => print_json(&document_status(session, config)),
        Commands::Changes { article } => print_query(&session.changes_in_article(article)),
        Commands::Summary => print_query(&session.summarize_all()),
        Commands::Statistics => print_query(&session.statistics()),
        Commands::Article { article } => print_query(&session.article_content(article)),
        Commands::Compare { article } => print_query(&session.compare_before_after(article)),
        Commands::Amendment { index } => print_query(&session.amendment_details(*index)),
        Commands::Search { amendment_type } => print_query(&session.search_by_type(amendment_type)),
        Commands::Analyze { index } => print_query(&session.detailed_amendment_analysis(*index)),
        Commands::Combined { article } => print_query(&session.combined_article_view(article)),
        Commands::Report { report_type } => {
            let publisher = LocalPublisher::from_config(config);
            let response =
                generate_report(session, &publisher, ReportType::from_name(report_type))?;
            eprintln!(
                "{} {}",
                style("Report saved to:").green().bold(),
                response.report_details.report_url
            );
            print_json(&response)
        }
    }
}

fn print_query<T: Serialize>(result: &std::result::Result<T, QueryError>) -> Result<()> {
    print_json(&to_response(result)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_article_commands() {
        let cli = Cli::parse_from(["amendment-analyzer", "combined", "12a"]);
        assert_eq!(
            cli.command,
            Commands::Combined {
                article: "12a".to_string()
            }
        );
        assert!(cli.decree.is_none());
    }

    #[test]
    fn test_cli_parse_negative_index() {
        let cli = Cli::parse_from(["amendment-analyzer", "amendment", "-1"]);
        assert_eq!(cli.command, Commands::Amendment { index: -1 });
    }

    #[test]
    fn test_cli_parse_global_references_after_subcommand() {
        let cli = Cli::parse_from([
            "amendment-analyzer",
            "summary",
            "--decree",
            "decree.json",
            "--amendments",
            "s3://bucket-name/a.json",
        ]);
        assert_eq!(cli.command, Commands::Summary);
        assert_eq!(cli.decree.as_deref(), Some("decree.json"));
        assert_eq!(cli.amendments.as_deref(), Some("s3://bucket-name/a.json"));
    }

    #[test]
    fn test_cli_parse_report_type() {
        let cli = Cli::parse_from(["amendment-analyzer", "report"]);
        assert_eq!(
            cli.command,
            Commands::Report {
                report_type: "comprehensive".to_string()
            }
        );

        let cli = Cli::parse_from(["amendment-analyzer", "report", "--type", "executive"]);
        assert_eq!(
            cli.command,
            Commands::Report {
                report_type: "executive".to_string()
            }
        );
    }

    #[test]
    fn test_cli_rejects_non_numeric_index() {
        assert!(Cli::try_parse_from(["amendment-analyzer", "analyze", "first"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "amendment-analyzer",
            "status",
            "--decree",
            "/tmp/decree.json",
            "--report-dir",
            "/tmp/reports",
        ]);
        let config = cli.config().unwrap();
        assert_eq!(config.decree_ref, "/tmp/decree.json");
        assert_eq!(config.report_dir, PathBuf::from("/tmp/reports"));
    }
}
