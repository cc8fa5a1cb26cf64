//! Source repository
//!
//! This module acquires the working copy that holds the model definitions and
//! enumerates the definition documents inside it.

use std::path::PathBuf;
use std::process::Stdio;
use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{info, debug};

use common::error::Error;
use settings::SourceSettings;

/// Local working copy of the model definition repository
#[derive(Debug, Clone)]
pub struct SourceRepository {
    /// Remote repository URL
    repo_url: String,

    /// Local working copy location
    checkout_dir: PathBuf,

    /// Directory of model definitions, relative to the working copy
    documents_dir: PathBuf,

    /// Accepted document extensions, each with a leading dot
    extensions: Vec<String>,
}

impl SourceRepository {
    /// Creates a new source repository from settings
    pub fn new(settings: &SourceSettings) -> Self {
        Self {
            repo_url: settings.repo_url.clone(),
            checkout_dir: settings.checkout_dir.clone(),
            documents_dir: settings.documents_dir.clone(),
            extensions: settings.normalized_extensions(),
        }
    }

    /// Gets the full path of the model definition directory
    pub fn documents_path(&self) -> PathBuf {
        self.checkout_dir.join(&self.documents_dir)
    }

    /// Makes sure a working copy exists, cloning it if needed
    ///
    /// An existing checkout directory is used as-is, without any update.
    /// Returns `true` if a clone was performed.
    pub async fn ensure_checkout(&self) -> Result<bool> {
        if self.checkout_dir.exists() {
            info!("Using existing working copy at {}", self.checkout_dir.display());
            return Ok(false);
        }

        info!("Cloning {} into {}", self.repo_url, self.checkout_dir.display());

        let output = Command::new("git")
            .arg("clone")
            .arg("--")
            .arg(&self.repo_url)
            .arg(&self.checkout_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::Source(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Source(format!(
                "git clone of {} failed ({}): {}",
                self.repo_url,
                output.status,
                stderr.trim()
            )).into());
        }

        info!("Clone of {} completed", self.repo_url);

        Ok(true)
    }

    /// Lists model definition documents
    ///
    /// Only direct children of the documents directory are considered;
    /// directories are skipped even if their name matches. Results are
    /// sorted by file name.
    pub async fn discover_documents(&self) -> Result<Vec<PathBuf>> {
        let documents_path = self.documents_path();

        let mut entries = tokio::fs::read_dir(&documents_path)
            .await
            .with_context(|| format!("Failed to read document directory {}", documents_path.display()))?;

        let mut documents = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if !self.matches_extension(&file_name) {
                continue;
            }

            let path = entry.path();

            if tokio::fs::metadata(&path).await?.is_dir() {
                debug!("Skipping directory {}", path.display());
                continue;
            }

            documents.push(path);
        }

        documents.sort();

        info!("Found {} model definition documents in {}", documents.len(), documents_path.display());

        Ok(documents)
    }

    /// Checks a file name against the accepted extensions
    fn matches_extension(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    fn settings_for(checkout: &Path, extensions: &[&str]) -> SourceSettings {
        SourceSettings {
            repo_url: "https://example.invalid/models.git".to_string(),
            checkout_dir: checkout.to_path_buf(),
            documents_dir: PathBuf::from("configs"),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_existing_checkout_is_not_cloned() {
        let dir = TempDir::new().unwrap();
        let repository = SourceRepository::new(&settings_for(dir.path(), &[".yaml"]));

        assert!(!repository.ensure_checkout().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_checkout_is_cloned() {
        let dir = TempDir::new().unwrap();
        let origin = dir.path().join("origin");
        std::fs::create_dir_all(origin.join("configs")).unwrap();
        std::fs::write(origin.join("configs").join("sam.yaml"), "name: sam\n").unwrap();

        let git = |args: &[&str]| {
            let status = StdCommand::new("git")
                .args(["-c", "user.name=Model Fetcher", "-c", "user.email=fetcher@example.invalid"])
                .args(args)
                .current_dir(&origin)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .unwrap();
            assert!(status.success(), "git {:?} failed", args);
        };
        git(&["init", "--quiet"]);
        git(&["add", "."]);
        git(&["commit", "--quiet", "-m", "initial"]);

        let checkout = dir.path().join("checkout");
        let mut settings = settings_for(&checkout, &[".yaml"]);
        settings.repo_url = origin.display().to_string();
        let repository = SourceRepository::new(&settings);

        assert!(repository.ensure_checkout().await.unwrap());
        assert!(checkout.join(".git").exists());
        assert_eq!(
            repository.discover_documents().await.unwrap(),
            vec![checkout.join("configs").join("sam.yaml")]
        );
        assert!(!repository.ensure_checkout().await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_clone_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_for(&dir.path().join("checkout"), &[".yaml"]);
        settings.repo_url = dir.path().join("no-such-repo").display().to_string();
        let repository = SourceRepository::new(&settings);

        let err = repository.ensure_checkout().await.unwrap_err();
        assert!(err.to_string().starts_with("Source error"));
    }

    #[tokio::test]
    async fn test_discover_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        let configs = dir.path().join("configs");
        std::fs::create_dir_all(configs.join("nested")).unwrap();
        std::fs::create_dir_all(configs.join("folder.yaml")).unwrap();
        std::fs::write(configs.join("sam.yaml"), "name: sam\n").unwrap();
        std::fs::write(configs.join("yolo.yml"), "name: yolo\n").unwrap();
        std::fs::write(configs.join("notes.txt"), "text").unwrap();
        std::fs::write(configs.join("nested").join("deep.yaml"), "name: deep\n").unwrap();

        let repository = SourceRepository::new(&settings_for(dir.path(), &[".yaml"]));
        let documents = repository.discover_documents().await.unwrap();
        assert_eq!(documents, vec![configs.join("sam.yaml")]);

        let repository = SourceRepository::new(&settings_for(dir.path(), &["yaml", "yml"]));
        let documents = repository.discover_documents().await.unwrap();
        assert_eq!(documents, vec![configs.join("sam.yaml"), configs.join("yolo.yml")]);
    }

    #[tokio::test]
    async fn test_missing_documents_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        let repository = SourceRepository::new(&settings_for(dir.path(), &[".yaml"]));

        let err = repository.discover_documents().await.unwrap_err();
        assert!(err.to_string().contains("Failed to read document directory"));
    }
}
