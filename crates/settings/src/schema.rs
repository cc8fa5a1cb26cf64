//! Settings schema
//!
//! Every section deserializes with defaults, so a partial file or a handful of
//! environment variables is enough to override individual values.

use std::fmt;
use std::str::FromStr;
use std::path::PathBuf;
use anyhow::Result;
use serde::{Deserialize, Serialize};

use common::error::Error;

/// Default repository holding the model definitions
pub const DEFAULT_REPO_URL: &str = "https://github.com/CVHub520/X-AnyLabeling.git";

/// Default directory of model definitions inside the repository
pub const DEFAULT_DOCUMENTS_DIR: &str = "anylabeling/configs/auto_labeling";

/// Complete settings for one fetch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherSettings {
    /// Where the model definitions come from
    pub source: SourceSettings,
    /// Where and how artifacts are downloaded
    pub download: DownloadSettings,
    /// Log output
    pub logging: LoggingSettings,
}

/// Source repository settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Remote repository URL
    pub repo_url: String,
    /// Local working copy location
    pub checkout_dir: PathBuf,
    /// Directory of model definitions, relative to the working copy
    pub documents_dir: PathBuf,
    /// Accepted document file extensions
    pub extensions: Vec<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            repo_url: DEFAULT_REPO_URL.to_string(),
            checkout_dir: PathBuf::from("X-AnyLabeling"),
            documents_dir: PathBuf::from(DEFAULT_DOCUMENTS_DIR),
            extensions: vec![".yaml".to_string()],
        }
    }
}

impl SourceSettings {
    /// Gets the extensions, each with a leading dot
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|ext| ext.trim())
            .filter(|ext| !ext.is_empty())
            .map(|ext| if ext.starts_with('.') { ext.to_string() } else { format!(".{}", ext) })
            .collect()
    }
}

/// Artifact download settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Root of the downloaded artifact tree
    pub output_dir: PathBuf,
    /// Write buffer size in bytes
    pub chunk_size: usize,
    /// User agent sent with every request
    pub user_agent: String,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds, unlimited when absent
    pub timeout_secs: Option<u64>,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloaded_models"),
            chunk_size: 1024,
            user_agent: format!("model-fetcher/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 30,
            timeout_secs: None,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl FetcherSettings {
    /// Validates settings that would otherwise fail late in the run
    pub fn validate(&self) -> Result<()> {
        if self.source.repo_url.trim().is_empty() {
            return Err(Error::Config("source.repo_url must not be empty".to_string()).into());
        }

        if self.source.normalized_extensions().is_empty() {
            return Err(Error::Config("source.extensions must name at least one extension".to_string()).into());
        }

        if self.download.chunk_size == 0 {
            return Err(Error::Config("download.chunk_size must be greater than zero".to_string()).into());
        }

        Ok(())
    }
}
