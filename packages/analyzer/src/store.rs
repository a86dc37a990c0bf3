//! Document store resolving references to raw bytes.
//!
//! A reference is one of:
//! - `s3://bucket/key`: fetched over HTTPS from the configured endpoint
//! - `http://...` / `https://...`: fetched directly
//! - `file://path` or any other string: read from the local filesystem
//!
//! Remote fetches retry 5xx responses, connect errors and timeouts according
//! to the configured [`RetryPolicy`]. Client errors (4xx) fail at once. Logs
//! and errors name the reference as written, not the resolved URL.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use amendment_engine::{AnalysisSession, DocumentStatus, DocumentStore};
use reqwest::blocking::Client;
use serde::Serialize;

use crate::config::{
    s3_object_url, split_s3_locator, AnalyzerConfig, RetryPolicy, HTTP_TIMEOUT_SECS,
};
use crate::error::{AnalyzerError, Result};

const USER_AGENT: &str = concat!("amendment-analyzer/", env!("CARGO_PKG_VERSION"));

/// Parsed document reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLocator {
    Local(PathBuf),
    Http(String),
    S3 { bucket: String, key: String },
}

impl DocumentLocator {
    /// Parse a reference string.
    ///
    /// # Examples
    /// ```
    /// use amendment_analyzer::store::DocumentLocator;
    ///
    /// let locator = DocumentLocator::parse("s3://legal-amendment-mcp/decrees/d.json").unwrap();
    /// assert_eq!(
    ///     locator,
    ///     DocumentLocator::S3 {
    ///         bucket: "legal-amendment-mcp".to_string(),
    ///         key: "decrees/d.json".to_string(),
    ///     }
    /// );
    /// assert!(DocumentLocator::parse("").is_err());
    /// ```
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(AnalyzerError::InvalidReference(reference.to_string()));
        }

        if reference.starts_with("s3://") {
            let (bucket, key) = split_s3_locator(reference)
                .ok_or_else(|| AnalyzerError::InvalidReference(reference.to_string()))?;
            return Ok(Self::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(Self::Http(reference.to_string()));
        }

        let path = reference.strip_prefix("file://").unwrap_or(reference);
        if path.is_empty() {
            return Err(AnalyzerError::InvalidReference(reference.to_string()));
        }
        Ok(Self::Local(PathBuf::from(path)))
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Local(_))
    }
}

impl fmt::Display for DocumentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Http(url) => f.write_str(url),
            Self::S3 { bucket, key } => write!(f, "s3://{bucket}/{key}"),
        }
    }
}

/// [`DocumentStore`] over local files, HTTP and S3-compatible endpoints.
///
/// The HTTP client is created on first remote fetch, so purely local use
/// never builds one.
#[derive(Debug, Default)]
pub struct ReferenceStore {
    s3_endpoint: Option<String>,
    retry: RetryPolicy,
    client: OnceLock<Client>,
}

/// Outcome of a single download attempt that did not fail for good.
enum Attempt {
    Fetched(Vec<u8>),
    Transient(String),
}

impl ReferenceStore {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            s3_endpoint: config.s3_endpoint.clone(),
            retry: config.retry,
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(self.client.get_or_init(|| client))
    }

    /// URL a remote locator is downloaded from.
    pub fn url_for(&self, locator: &DocumentLocator) -> Option<String> {
        match locator {
            DocumentLocator::Local(_) => None,
            DocumentLocator::Http(url) => Some(url.clone()),
            DocumentLocator::S3 { bucket, key } => {
                Some(s3_object_url(self.s3_endpoint.as_deref(), bucket, key))
            }
        }
    }

    /// Fetch the bytes behind a parsed locator.
    pub fn fetch_locator(&self, locator: &DocumentLocator) -> Result<Vec<u8>> {
        match locator {
            DocumentLocator::Local(path) => {
                tracing::debug!(path = %path.display(), "Reading local document");
                fs::read(path).map_err(|source| AnalyzerError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
            remote => {
                let url = self
                    .url_for(remote)
                    .ok_or_else(|| AnalyzerError::InvalidReference(remote.to_string()))?;
                self.download(remote, &url)
            }
        }
    }

    fn download(&self, locator: &DocumentLocator, url: &str) -> Result<Vec<u8>> {
        let client = self.client()?;
        let max_attempts = self.retry.max_attempts();
        tracing::debug!(%locator, url, "Downloading document");

        let mut last_failure = None;
        for attempt in 0..max_attempts {
            if let Some(delay) = self.retry.delay_before(attempt) {
                tracing::debug!(%locator, delay = ?delay, "Retrying after delay");
                thread::sleep(delay);
            }

            match download_once(client, locator, url)? {
                Attempt::Fetched(bytes) => {
                    tracing::debug!(%locator, bytes = bytes.len(), "Downloaded document");
                    return Ok(bytes);
                }
                Attempt::Transient(reason) => {
                    tracing::warn!(
                        %locator,
                        reason = %reason,
                        attempt = attempt + 1,
                        max_attempts,
                        "Transient download failure"
                    );
                    last_failure = Some(reason);
                }
            }
        }

        Err(AnalyzerError::RetriesExhausted {
            reference: locator.to_string(),
            attempts: max_attempts,
            message: last_failure.unwrap_or_else(|| "no attempt made".to_string()),
        })
    }
}

/// One GET. Transient failures are returned for the caller to retry, every
/// other failure is final.
fn download_once(client: &Client, locator: &DocumentLocator, url: &str) -> Result<Attempt> {
    let failed = |source: reqwest::Error| AnalyzerError::Download {
        reference: locator.to_string(),
        source: source.without_url(),
    };

    let response = match client.get(url).send() {
        Ok(response) => response,
        Err(err) if err.is_connect() || err.is_timeout() => {
            return Ok(Attempt::Transient(err.without_url().to_string()));
        }
        Err(err) => return Err(failed(err)),
    };

    let status = response.status();
    if status.is_server_error() {
        return Ok(Attempt::Transient(format!("server error: {status}")));
    }

    let bytes = response
        .error_for_status()
        .and_then(|response| response.bytes())
        .map_err(failed)?;
    Ok(Attempt::Fetched(bytes.to_vec()))
}

impl DocumentStore for ReferenceStore {
    type Error = AnalyzerError;

    fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        self.fetch_locator(&DocumentLocator::parse(reference)?)
    }
}

/// Load the configured decree and amendment documents into a session.
///
/// Either both documents are replaced or neither is.
pub fn load_default_documents(session: &AnalysisSession, config: &AnalyzerConfig) -> Result<()> {
    let store = ReferenceStore::new(config);
    session.load_documents_from(&store, &config.decree_ref, &config.amendments_ref)
}

/// Session state together with where documents are loaded from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStatus {
    pub s3_bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_endpoint: Option<String>,
    pub decree_ref: String,
    pub amendments_ref: String,
    #[serde(flatten)]
    pub session: DocumentStatus,
}

pub fn document_status(session: &AnalysisSession, config: &AnalyzerConfig) -> StoreStatus {
    StoreStatus {
        s3_bucket: config.s3_bucket.clone(),
        s3_endpoint: config.s3_endpoint.clone(),
        decree_ref: config.decree_ref.clone(),
        amendments_ref: config.amendments_ref.clone(),
        session: session.status(),
    }
}
