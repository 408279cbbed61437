// src/config.rs
//! Configuration file parsing
//!
//! Supports TOML configuration files with the following sections:
//! - [database] - Location of the SQLite mirror
//! - [sources] - URLs of the remote catalog documents
//! - [sync] - Commit batch size, staleness buffer, keyword removal policy
//! - [http] - Request timeout and User-Agent
//!
//! Every field has a default, so an empty (or missing) file is valid.

use crate::sync::client::{HTTP_TIMEOUT, USER_AGENT};
use crate::sync::{DEFAULT_BATCH_SIZE, KeywordRemoval, Sources, SyncOptions};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
pub struct GrumpyConfig {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseSection,

    /// Remote document locations
    #[serde(default)]
    pub sources: Sources,

    /// Reconciliation settings
    #[serde(default)]
    pub sync: SyncSection,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSection,
}

/// Database configuration section
#[derive(Debug, Deserialize)]
pub struct DatabaseSection {
    /// Path to the SQLite database
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

pub fn default_db_path() -> String {
    "/var/lib/grumpy/grumpy.db".to_string()
}

/// Sync configuration section
#[derive(Debug, Deserialize)]
pub struct SyncSection {
    /// Packages per committed batch during version sync
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Minimum age of a package's last sync before it is refreshed (e.g., "1h", "30m")
    #[serde(default = "default_staleness_buffer")]
    pub staleness_buffer: String,

    /// "destroy" deletes a dropped keyword everywhere, "detach" only unlinks it
    #[serde(default)]
    pub keyword_removal: KeywordRemoval,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            staleness_buffer: default_staleness_buffer(),
            keyword_removal: KeywordRemoval::default(),
        }
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_staleness_buffer() -> String {
    "1h".to_string()
}

/// HTTP configuration section
#[derive(Debug, Deserialize)]
pub struct HttpSection {
    /// Request timeout (e.g., "30s")
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> String {
    format!("{}s", HTTP_TIMEOUT.as_secs())
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

impl GrumpyConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: GrumpyConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sync.batch_size == 0 {
            anyhow::bail!("sync.batch_size must be at least 1");
        }

        parse_duration(&self.sync.staleness_buffer).with_context(|| {
            format!("Invalid sync.staleness_buffer: {}", self.sync.staleness_buffer)
        })?;

        let timeout = parse_duration(&self.http.timeout)
            .with_context(|| format!("Invalid http.timeout: {}", self.http.timeout))?;
        if timeout.is_zero() {
            anyhow::bail!("http.timeout must be greater than zero");
        }

        self.sources.validate()?;
        Ok(())
    }

    /// Options for the version sync
    pub fn sync_options(&self, limit: Option<usize>) -> Result<SyncOptions> {
        Ok(SyncOptions {
            batch_size: self.sync.batch_size,
            staleness_buffer: parse_duration(&self.sync.staleness_buffer)?,
            keyword_removal: self.sync.keyword_removal,
            limit,
        })
    }

    /// Parse the HTTP timeout to Duration
    pub fn http_timeout(&self) -> Result<Duration> {
        parse_duration(&self.http.timeout)
    }
}

/// Parse a human-readable duration string (e.g., "15m", "1h", "30s")
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('d') {
        (n, 24 * 60 * 60)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 60 * 60)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Assume seconds
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration number: {}", num_str))?;

    let secs = num
        .checked_mul(multiplier)
        .with_context(|| format!("Duration too large: {}", s))?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(15 * 60));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("2d").unwrap(), Duration::from_secs(2 * 24 * 3600));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_parse_duration_overflow() {
        assert!(parse_duration("999999999999999999d").is_err());
        assert!(parse_duration(&format!("{}s", u64::MAX)).is_ok());
        assert!(parse_duration(&format!("{}m", u64::MAX)).is_err());
    }

    #[test]
    fn test_default_config() {
        let config = GrumpyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.database.path, "/var/lib/grumpy/grumpy.db");
        assert_eq!(config.http.timeout, "30s");

        let options = config.sync_options(None).unwrap();
        assert_eq!(options, SyncOptions::default());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[database]
path = "/tmp/grumpy.db"

[sources]
categories = "http://localhost:8000/categories.json"

[sync]
batch_size = 25
staleness_buffer = "30m"
keyword_removal = "detach"

[http]
timeout = "10s"
user_agent = "grumpy-test"
"#;
        let config: GrumpyConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.database.path, "/tmp/grumpy.db");
        assert_eq!(config.sources.categories, "http://localhost:8000/categories.json");
        assert_eq!(config.sources.projects, Sources::default().projects);
        assert_eq!(config.http_timeout().unwrap(), Duration::from_secs(10));

        let options = config.sync_options(Some(5)).unwrap();
        assert_eq!(options.batch_size, 25);
        assert_eq!(options.staleness_buffer, Duration::from_secs(1800));
        assert_eq!(options.keyword_removal, KeywordRemoval::Detach);
        assert_eq!(options.limit, Some(5));
    }

    #[test]
    fn test_invalid_batch_size() {
        let config: GrumpyConfig = toml::from_str("[sync]\nbatch_size = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_staleness_buffer() {
        let config: GrumpyConfig =
            toml::from_str("[sync]\nstaleness_buffer = \"an hour\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_keyword_policy_rejected() {
        let result: std::result::Result<GrumpyConfig, _> =
            toml::from_str("[sync]\nkeyword_removal = \"refcount\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("grumpy.toml");
        std::fs::write(&path, "[sync]\nbatch_size = 7\n").unwrap();

        let config = GrumpyConfig::load(&path).unwrap();
        assert_eq!(config.sync.batch_size, 7);
        assert!(GrumpyConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
