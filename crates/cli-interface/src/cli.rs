//! Command-line arguments
//!
//! Flags override values from the configuration file and the environment.

use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use tracing::debug;

use settings::{FetcherSettings, LogFormat, SettingsLoader};

/// Download every model artifact referenced by a repository of model definitions
#[derive(Debug, Clone, Parser)]
#[command(name = "model-fetcher", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long, env = "MODEL_FETCHER_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Repository holding the model definitions
    #[arg(long, value_name = "URL")]
    pub repo_url: Option<String>,

    /// Where the repository is checked out
    #[arg(long, value_name = "DIR")]
    pub checkout_dir: Option<PathBuf>,

    /// Directory of model definitions inside the checkout
    #[arg(long, value_name = "DIR")]
    pub documents_dir: Option<PathBuf>,

    /// Root directory for downloaded artifacts
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Model definition file extension; repeat to accept several
    #[arg(long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Log filter, e.g. `info` or `model_manager=debug`
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log line format: text or json
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// List planned downloads without fetching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with a non-zero status if any artifact failed
    #[arg(long)]
    pub strict: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Write a JSON run report to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl Cli {
    /// Loads settings and applies the command-line overrides
    pub fn load_settings(&self) -> Result<FetcherSettings> {
        let loader = match &self.config {
            Some(path) => SettingsLoader::new().with_file(path),
            None => SettingsLoader::new(),
        };

        let mut settings = loader.load()?;
        self.apply_overrides(&mut settings);
        settings.validate()?;

        debug!("Effective settings: {:?}", settings);

        Ok(settings)
    }

    /// Overrides settings with the flags that were given
    pub fn apply_overrides(&self, settings: &mut FetcherSettings) {
        if let Some(repo_url) = &self.repo_url {
            settings.source.repo_url = repo_url.clone();
        }

        if let Some(checkout_dir) = &self.checkout_dir {
            settings.source.checkout_dir = checkout_dir.clone();
        }

        if let Some(documents_dir) = &self.documents_dir {
            settings.source.documents_dir = documents_dir.clone();
        }

        if let Some(output_dir) = &self.output_dir {
            settings.download.output_dir = output_dir.clone();
        }

        if !self.extensions.is_empty() {
            settings.source.extensions = self.extensions.clone();
        }

        if let Some(level) = &self.log_level {
            settings.logging.level = level.clone();
        }

        if let Some(format) = self.log_format {
            settings.logging.format = format;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from([
            "model-fetcher",
            "--repo-url", "https://example.com/models.git",
            "--output-dir", "/data/models",
            "--extension", "yaml",
            "--extension", "yml",
            "--log-format", "json",
            "--dry-run",
        ]);

        let mut settings = FetcherSettings::default();
        cli.apply_overrides(&mut settings);

        assert!(cli.dry_run);
        assert!(!cli.strict);
        assert_eq!(settings.source.repo_url, "https://example.com/models.git");
        assert_eq!(settings.download.output_dir, PathBuf::from("/data/models"));
        assert_eq!(settings.source.extensions, vec!["yaml", "yml"]);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.source.checkout_dir, PathBuf::from("X-AnyLabeling"));
    }

    #[test]
    fn test_no_flags_keep_settings() {
        let cli = Cli::parse_from(["model-fetcher"]);
        let mut settings = FetcherSettings::default();
        cli.apply_overrides(&mut settings);

        assert_eq!(settings, FetcherSettings::default());
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        assert!(Cli::try_parse_from(["model-fetcher", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn test_load_settings_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fetcher.yaml");
        std::fs::write(&path, "download:\n  output_dir: from-file\n").unwrap();

        let cli = Cli::parse_from([
            "model-fetcher",
            "--config", path.to_str().unwrap(),
            "--checkout-dir", "checkout",
        ]);
        let settings = cli.load_settings().unwrap();

        assert_eq!(settings.download.output_dir, PathBuf::from("from-file"));
        assert_eq!(settings.source.checkout_dir, PathBuf::from("checkout"));
    }
}
