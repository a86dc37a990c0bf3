//! Amendment Analyzer - Load legal documents, analyze amendments, publish reports.
//!
//! This crate wires the `amendment-engine` query core to real document
//! sources (local files, HTTP, S3-compatible object stores), exposes every
//! query on the command line, and renders analysis reports.
//!
//! # Example
//!
//! ```
//! use amendment_analyzer::store::DocumentLocator;
//!
//! // Validate document references before fetching them
//! assert!(DocumentLocator::parse("s3://legal-amendment-mcp/decrees/d.json").is_ok());
//! assert!(DocumentLocator::parse("s3://legal-amendment-mcp").is_err());
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants, environment loading and validation
//! - [`error`]: Error types and Result alias
//! - [`store`]: Document references and the document store, with retrying
//!   remote fetches
//! - [`report`]: Report rendering and publishing
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod store;

// Re-export main functions
pub use report::generate_report;
pub use store::load_default_documents;

// Re-export commonly used items
pub use config::{AnalyzerConfig, RetryPolicy};
pub use error::{AnalyzerError, Result};
pub use report::{LocalPublisher, ReportPublisher, ReportResponse, ReportType};
pub use store::{DocumentLocator, ReferenceStore};
