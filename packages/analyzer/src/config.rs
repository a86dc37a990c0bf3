//! Configuration constants and validation functions for the analyzer.

use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{AnalyzerError, Result};

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Attempts per remote fetch, the first request included.
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;

/// Delay before the first retry, doubled for every further one.
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Bucket holding the default decree and amendment documents.
pub const DEFAULT_S3_BUCKET: &str = "legal-amendment-mcp";

/// Object key of the default base decree.
pub const DEFAULT_DECREE_KEY: &str = "decrees/Decree-118_2021.json";

/// Object key of the default amendment document, spelled as published in
/// the source bucket.
pub const DEFAULT_AMENDMENT_KEY: &str = "ammendments/190_2025_ND-CP.json";

/// Key prefix under which reports are published.
pub const REPORT_KEY_PREFIX: &str = "reports";

/// Default local directory reports are written to.
pub const DEFAULT_REPORT_DIR: &str = ".";

/// How long a published report link is advertised as valid.
pub const REPORT_LINK_EXPIRY: &str = "7 days";

/// Text wrap width for report paragraphs.
pub const TEXT_WRAP_WIDTH: usize = 100;

/// Environment variable names read by [`AnalyzerConfig::from_env`].
pub mod env_vars {
    pub const DECREE_REF: &str = "AMENDMENT_DECREE_REF";
    pub const AMENDMENTS_REF: &str = "AMENDMENT_AMENDMENTS_REF";
    pub const S3_BUCKET: &str = "S3_BUCKET";
    pub const S3_ENDPOINT: &str = "S3_ENDPOINT";
    pub const REPORT_DIR: &str = "REPORT_DIR";
    pub const REPORT_BASE_URL: &str = "REPORT_BASE_URL";
    pub const FETCH_ATTEMPTS: &str = "AMENDMENT_FETCH_ATTEMPTS";
}

/// S3 bucket name: 3-63 lowercase letters, digits, dots and hyphens,
/// starting and ending with a letter or digit.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BUCKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").expect("valid regex"));

/// `s3://bucket/key` with a non-empty key.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static S3_LOCATOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^s3://([^/]+)/(.+)$").expect("valid regex"));

/// Absolute http(s) base URL.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BASE_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/]+(/\S*)?$").expect("valid regex"));

/// Validate an S3 bucket name.
///
/// # Examples
/// ```
/// use amendment_analyzer::config::validate_bucket;
///
/// assert!(validate_bucket("legal-amendment-mcp").is_ok());
/// assert!(validate_bucket("Bad_Bucket").is_err());
/// ```
pub fn validate_bucket(bucket: &str) -> Result<()> {
    if BUCKET_PATTERN.is_match(bucket) {
        Ok(())
    } else {
        Err(AnalyzerError::Config(format!("invalid S3 bucket name '{bucket}'")))
    }
}

/// Validate an absolute http(s) URL used as an endpoint or link base.
pub fn validate_base_url(url: &str) -> Result<()> {
    if BASE_URL_PATTERN.is_match(url) {
        Ok(())
    } else {
        Err(AnalyzerError::Config(format!(
            "'{url}' is not an absolute http(s) URL"
        )))
    }
}

/// Split an `s3://bucket/key` locator into bucket and key.
///
/// Returns `None` when the reference is not shaped like an S3 locator or
/// the bucket name is invalid.
///
/// # Examples
/// ```
/// use amendment_analyzer::config::split_s3_locator;
///
/// assert_eq!(
///     split_s3_locator("s3://legal-amendment-mcp/decrees/d.json"),
///     Some(("legal-amendment-mcp", "decrees/d.json"))
/// );
/// assert_eq!(split_s3_locator("s3://legal-amendment-mcp"), None);
/// ```
pub fn split_s3_locator(reference: &str) -> Option<(&str, &str)> {
    let captures = S3_LOCATOR_PATTERN.captures(reference)?;
    let bucket = captures.get(1)?.as_str();
    let key = captures.get(2)?.as_str();
    BUCKET_PATTERN.is_match(bucket).then_some((bucket, key))
}

/// Build the HTTPS URL of an S3 object.
///
/// Without an endpoint the virtual-hosted AWS form is used. A custom
/// endpoint (MinIO, LocalStack, a test server) is addressed path-style.
pub fn s3_object_url(endpoint: Option<&str>, bucket: &str, key: &str) -> String {
    match endpoint {
        Some(endpoint) => format!("{}/{bucket}/{key}", endpoint.trim_end_matches('/')),
        None => format!("https://{bucket}.s3.amazonaws.com/{key}"),
    }
}

/// How remote fetches retry transient failures (5xx, connect, timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_ATTEMPTS, Duration::from_millis(RETRY_BASE_DELAY_MS))
    }
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before the zero-based `attempt`; `None` for the first one.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use amendment_analyzer::config::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.delay_before(0), None);
    /// assert_eq!(policy.delay_before(1), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_before(2), Some(Duration::from_millis(1000)));
    /// ```
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        let retry = attempt.checked_sub(1)?;
        Some(self.base_delay.saturating_mul(1 << retry.min(16)))
    }
}

/// Runtime configuration of the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Reference of the base decree (path, URL or `s3://` locator).
    pub decree_ref: String,
    /// Reference of the amendment document.
    pub amendments_ref: String,
    pub s3_bucket: String,
    pub s3_endpoint: Option<String>,
    /// Directory under which `reports/...` files are written.
    pub report_dir: PathBuf,
    /// Public base URL for report links. Without one, links are `file://` URLs.
    pub report_base_url: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            decree_ref: format!("s3://{DEFAULT_S3_BUCKET}/{DEFAULT_DECREE_KEY}"),
            amendments_ref: format!("s3://{DEFAULT_S3_BUCKET}/{DEFAULT_AMENDMENT_KEY}"),
            s3_bucket: DEFAULT_S3_BUCKET.to_string(),
            s3_endpoint: None,
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            report_base_url: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unset or blank variables keep their defaults. When only `S3_BUCKET`
    /// is set, the default document references move to that bucket.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(bucket) = get(env_vars::S3_BUCKET) {
            config = config.with_bucket(bucket)?;
        }
        if let Some(endpoint) = get(env_vars::S3_ENDPOINT) {
            config = config.with_s3_endpoint(endpoint)?;
        }
        if let Some(decree) = get(env_vars::DECREE_REF) {
            config.decree_ref = decree;
        }
        if let Some(amendments) = get(env_vars::AMENDMENTS_REF) {
            config.amendments_ref = amendments;
        }
        if let Some(dir) = get(env_vars::REPORT_DIR) {
            config.report_dir = PathBuf::from(dir);
        }
        if let Some(base_url) = get(env_vars::REPORT_BASE_URL) {
            config = config.with_report_base_url(base_url)?;
        }
        if let Some(attempts) = get(env_vars::FETCH_ATTEMPTS) {
            let attempts = attempts
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AnalyzerError::Config(format!(
                        "{} must be a positive integer, got '{attempts}'",
                        env_vars::FETCH_ATTEMPTS
                    ))
                })?;
            config.retry = RetryPolicy::new(attempts, config.retry.base_delay);
        }

        tracing::debug!(
            decree = %config.decree_ref,
            amendments = %config.amendments_ref,
            bucket = %config.s3_bucket,
            "Loaded analyzer configuration"
        );
        Ok(config)
    }

    /// Use another bucket, re-pointing the default document references to it.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into();
        validate_bucket(&bucket)?;
        self.decree_ref = format!("s3://{bucket}/{DEFAULT_DECREE_KEY}");
        self.amendments_ref = format!("s3://{bucket}/{DEFAULT_AMENDMENT_KEY}");
        self.s3_bucket = bucket;
        Ok(self)
    }

    pub fn with_s3_endpoint(mut self, endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        validate_base_url(&endpoint)?;
        self.s3_endpoint = Some(endpoint);
        Ok(self)
    }

    pub fn with_documents(
        mut self,
        decree: impl Into<String>,
        amendments: impl Into<String>,
    ) -> Self {
        self.decree_ref = decree.into();
        self.amendments_ref = amendments.into();
        self
    }

    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_report_base_url(mut self, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        validate_base_url(&base_url)?;
        self.report_base_url = Some(base_url);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_validate_bucket() {
        assert!(validate_bucket("legal-amendment-mcp").is_ok());
        assert!(validate_bucket("abc").is_ok());
        assert!(validate_bucket("my.bucket.name").is_ok());

        assert!(validate_bucket("").is_err());
        assert!(validate_bucket("ab").is_err()); // Too short
        assert!(validate_bucket("Upper").is_err());
        assert!(validate_bucket("-leading").is_err());
        assert!(validate_bucket("trailing-").is_err());
        assert!(validate_bucket(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_split_s3_locator() {
        assert_eq!(
            split_s3_locator("s3://legal-amendment-mcp/decrees/Decree-118_2021.json"),
            Some(("legal-amendment-mcp", "decrees/Decree-118_2021.json"))
        );
        assert_eq!(split_s3_locator("s3://bucket-name/"), None);
        assert_eq!(split_s3_locator("s3:///key.json"), None);
        assert_eq!(split_s3_locator("s3://UPPER/key.json"), None);
        assert_eq!(split_s3_locator("https://example.com/key.json"), None);
    }

    #[test]
    fn test_s3_object_url() {
        assert_eq!(
            s3_object_url(None, "legal-amendment-mcp", "decrees/d.json"),
            "https://legal-amendment-mcp.s3.amazonaws.com/decrees/d.json"
        );
        assert_eq!(
            s3_object_url(Some("http://localhost:9000/"), "bucket", "a/b.json"),
            "http://localhost:9000/bucket/a/b.json"
        );
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://reports.example.com").is_ok());
        assert!(validate_base_url("http://127.0.0.1:8080/files").is_ok());
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("example.com").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(
            config.decree_ref,
            "s3://legal-amendment-mcp/decrees/Decree-118_2021.json"
        );
        assert_eq!(config.report_dir, PathBuf::from("."));
    }

    #[test]
    fn test_bucket_override_moves_default_references() {
        let config =
            AnalyzerConfig::from_lookup(lookup(&[(env_vars::S3_BUCKET, "other-bucket")])).unwrap();
        assert_eq!(config.s3_bucket, "other-bucket");
        assert_eq!(config.amendments_ref, format!("s3://other-bucket/{DEFAULT_AMENDMENT_KEY}"));
    }

    #[test]
    fn test_explicit_references_win_over_bucket() {
        let config = AnalyzerConfig::from_lookup(lookup(&[
            (env_vars::S3_BUCKET, "other-bucket"),
            (env_vars::DECREE_REF, "/data/decree.json"),
            (env_vars::AMENDMENTS_REF, "https://example.com/a.json"),
            (env_vars::REPORT_DIR, "/tmp/out"),
        ]))
        .unwrap();
        assert_eq!(config.decree_ref, "/data/decree.json");
        assert_eq!(config.amendments_ref, "https://example.com/a.json");
        assert_eq!(config.report_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_blank_variables_are_ignored() {
        let config = AnalyzerConfig::from_lookup(lookup(&[(env_vars::S3_ENDPOINT, "  ")])).unwrap();
        assert!(config.s3_endpoint.is_none());
    }

    #[test]
    fn test_retry_policy_backoff() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100));
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.delay_before(0), None);
        assert_eq!(policy.delay_before(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_before(3), Some(Duration::from_millis(400)));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[test]
    fn test_fetch_attempts_from_environment() {
        let config =
            AnalyzerConfig::from_lookup(lookup(&[(env_vars::FETCH_ATTEMPTS, "5")])).unwrap();
        assert_eq!(config.retry.max_attempts(), 5);
        assert_eq!(config.retry.delay_before(1), Some(Duration::from_millis(500)));

        for bad in ["0", "-1", "many"] {
            let err = AnalyzerConfig::from_lookup(lookup(&[(env_vars::FETCH_ATTEMPTS, bad)]))
                .unwrap_err();
            assert!(err.to_string().contains("AMENDMENT_FETCH_ATTEMPTS"), "{bad}");
        }
    }

    #[test]
    fn test_default_amendment_key_matches_source_bucket() {
        assert_eq!(
            AnalyzerConfig::default().amendments_ref,
            "s3://legal-amendment-mcp/ammendments/190_2025_ND-CP.json"
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = AnalyzerConfig::from_lookup(lookup(&[(env_vars::S3_BUCKET, "Not_A_Bucket")]))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Config(_)));

        let err = AnalyzerConfig::from_lookup(lookup(&[(env_vars::REPORT_BASE_URL, "reports")]))
            .unwrap_err();
        assert!(err.to_string().contains("not an absolute http(s) URL"));
    }
}
