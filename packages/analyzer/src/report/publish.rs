//! Publishing rendered reports.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use uuid::Uuid;

use crate::config::{AnalyzerConfig, REPORT_KEY_PREFIX};
use crate::error::{AnalyzerError, Result};

/// Where a published report lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedReport {
    /// Key the report was stored under.
    pub storage_key: String,
    /// Link readers use to fetch the report. Built from `storage_key`.
    pub url: String,
}

/// Destination for rendered reports.
pub trait ReportPublisher {
    fn publish(&self, key: &str, content: &[u8]) -> Result<PublishedReport>;
}

/// Storage key for a report generated at `at`.
///
/// `reports/legal_amendment_report_{YYYYmmdd_HHMMSS}_{8 hex}.md`
pub fn report_key<Tz: TimeZone>(at: &DateTime<Tz>, id: Uuid) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut suffix = id.simple().to_string();
    suffix.truncate(8);
    format!(
        "{REPORT_KEY_PREFIX}/legal_amendment_report_{}_{suffix}.md",
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Writes reports below a local directory.
///
/// Links point at `{base_url}/{key}` when a public base URL is configured,
/// otherwise at the written file as a `file://` URL.
#[derive(Debug, Clone)]
pub struct LocalPublisher {
    root: PathBuf,
    base_url: Option<String>,
}

impl LocalPublisher {
    pub fn new(root: impl Into<PathBuf>, base_url: Option<String>) -> Self {
        Self {
            root: root.into(),
            base_url,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.report_dir.clone(), config.report_base_url.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn link_for(&self, key: &str, path: &Path) -> Result<String> {
        match &self.base_url {
            Some(base) => Ok(format!("{}/{key}", base.trim_end_matches('/'))),
            None => Ok(format!("file://{}", fs::canonicalize(path)?.display())),
        }
    }
}

impl ReportPublisher for LocalPublisher {
    /// Uses atomic write pattern: writes to temp file, syncs to disk, then renames.
    fn publish(&self, key: &str, content: &[u8]) -> Result<PublishedReport> {
        if key.is_empty() || key.split('/').any(|part| part.is_empty() || part == "..") {
            return Err(AnalyzerError::Config(format!("invalid report key '{key}'")));
        }

        let output_file = self.root.join(key);
        let (Some(output_dir), Some(file_name)) = (output_file.parent(), output_file.file_name())
        else {
            return Err(AnalyzerError::Config(format!("invalid report key '{key}'")));
        };
        fs::create_dir_all(output_dir)?;

        let temp_file = output_dir.join(format!(".{}.tmp", file_name.to_string_lossy()));
        {
            let mut file = File::create(&temp_file)?;
            file.write_all(content)?;
            file.sync_all()?;
        }

        // On Windows, rename fails if the destination already exists
        #[cfg(target_os = "windows")]
        if output_file.exists() {
            fs::remove_file(&output_file)?;
        }

        fs::rename(&temp_file, &output_file)?;

        let url = self.link_for(key, &output_file)?;
        tracing::info!(key, path = %output_file.display(), "Published report");
        Ok(PublishedReport {
            storage_key: key.to_string(),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_report_key_format() {
        let at = Utc.with_ymd_and_hms(2025, 7, 1, 9, 5, 3).unwrap();
        let id = Uuid::parse_str("3f2504e0-4f89-11d3-9a0c-0305e82c3301").unwrap();
        assert_eq!(
            report_key(&at, id),
            "reports/legal_amendment_report_20250701_090503_3f2504e0.md"
        );
    }

    #[test]
    fn test_publish_writes_file_and_links_same_key() {
        let dir = tempdir().unwrap();
        let publisher =
            LocalPublisher::new(dir.path(), Some("https://reports.example.com/".to_string()));

        let key = "reports/legal_amendment_report_20250701_090503_3f2504e0.md";
        let published = publisher.publish(key, b"# Report\n").unwrap();

        assert_eq!(published.storage_key, key);
        assert_eq!(published.url, format!("https://reports.example.com/{key}"));
        assert_eq!(fs::read_to_string(dir.path().join(key)).unwrap(), "# Report\n");

        // No temp file left behind
        let leftovers: Vec<_> = fs::read_dir(dir.path().join("reports"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_publish_without_base_url_links_file() {
        let dir = tempdir().unwrap();
        let publisher = LocalPublisher::new(dir.path(), None);
        let published = publisher.publish("reports/r.md", b"x").unwrap();
        assert!(published.url.starts_with("file://"));
        assert!(published.url.ends_with("reports/r.md"));
    }

    #[test]
    fn test_publish_overwrites_existing_report() {
        let dir = tempdir().unwrap();
        let publisher = LocalPublisher::new(dir.path(), None);
        publisher.publish("reports/r.md", b"old").unwrap();
        publisher.publish("reports/r.md", b"new").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("reports/r.md")).unwrap(), "new");
    }

    #[test]
    fn test_publish_rejects_escaping_keys() {
        let dir = tempdir().unwrap();
        let publisher = LocalPublisher::new(dir.path(), None);
        for key in ["", "../r.md", "reports//r.md", "reports/"] {
            assert!(publisher.publish(key, b"x").is_err(), "{key:?} should be rejected");
        }
    }
}
