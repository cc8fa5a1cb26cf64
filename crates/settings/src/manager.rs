//! Settings loader
//!
//! Layers, lowest precedence first: built-in defaults, a configuration file,
//! then `MODEL_FETCHER_*` environment variables (`__` separates nested keys,
//! e.g. `MODEL_FETCHER_DOWNLOAD__OUTPUT_DIR`).

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use tracing::debug;

use common::error::Error;
use crate::schema::FetcherSettings;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MODEL_FETCHER";

/// Builds [`FetcherSettings`] from files and the environment
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    /// Explicit configuration file, must exist when set
    file: Option<PathBuf>,

    /// Whether to look for the per-user configuration file
    use_default_file: bool,

    /// Whether to read environment overrides
    use_environment: bool,
}

impl SettingsLoader {
    /// Creates a loader that reads the per-user file and the environment
    pub fn new() -> Self {
        Self {
            file: None,
            use_default_file: true,
            use_environment: true,
        }
    }

    /// Reads settings from the given file instead of the per-user one
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self.use_default_file = false;
        self
    }

    /// Ignores `MODEL_FETCHER_*` environment variables
    pub fn without_environment(mut self) -> Self {
        self.use_environment = false;
        self
    }

    /// Ignores the per-user configuration file
    pub fn without_default_file(mut self) -> Self {
        self.use_default_file = false;
        self
    }

    /// Location of the per-user configuration file
    pub fn default_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("model-fetcher").join("config.yaml"))
    }

    /// Loads and validates the settings
    pub fn load(&self) -> Result<FetcherSettings> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            if !path.exists() {
                return Err(Error::NotFound(format!(
                    "Configuration file {} does not exist",
                    path.display()
                )).into());
            }
            debug!("Loading settings from {}", path.display());
            builder = builder.add_source(File::from(path.as_path()).required(true));
        } else if self.use_default_file {
            if let Some(path) = Self::default_file() {
                debug!("Looking for optional settings file at {}", path.display());
                builder = builder.add_source(File::from(path.as_path()).required(false));
            }
        }

        if self.use_environment {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let settings: FetcherSettings = builder
            .build()
            .context("Failed to assemble settings")?
            .try_deserialize()
            .context("Failed to parse settings")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Loads settings from a single file, ignoring the environment
    pub fn load_file(path: &Path) -> Result<FetcherSettings> {
        Self::new().with_file(path).without_environment().load()
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LogFormat;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_sources_yields_defaults() {
        let settings = SettingsLoader::new()
            .without_default_file()
            .without_environment()
            .load()
            .unwrap();
        assert_eq!(settings, FetcherSettings::default());
    }

    #[test]
    fn test_partial_yaml_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fetcher.yaml");
        std::fs::write(
            &path,
            "download:\n  output_dir: /tmp/models\n  chunk_size: 8192\nlogging:\n  format: json\n",
        ).unwrap();

        let settings = SettingsLoader::load_file(&path).unwrap();
        assert_eq!(settings.download.output_dir, PathBuf::from("/tmp/models"));
        assert_eq!(settings.download.chunk_size, 8192);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.source, crate::schema::SourceSettings::default());
    }

    #[test]
    fn test_toml_file_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fetcher.toml");
        std::fs::write(
            &path,
            "[source]\nrepo_url = \"https://example.com/models.git\"\nextensions = [\".yml\"]\n",
        ).unwrap();

        let settings = SettingsLoader::load_file(&path).unwrap();
        assert_eq!(settings.source.repo_url, "https://example.com/models.git");
        assert_eq!(settings.source.extensions, vec![".yml"]);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = SettingsLoader::load_file(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fetcher.yaml");
        std::fs::write(&path, "download:\n  chunk_size: 0\n").unwrap();

        assert!(SettingsLoader::load_file(&path).is_err());
    }
}
