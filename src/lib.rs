//! Main integration module for Model Fetcher
//!
//! This module wires the source repository, the document parser, and the
//! artifact downloader into a single sequential fetch run.

use std::sync::Arc;
use std::path::Path;
use anyhow::Result;
use tracing::{info, warn};

use common::models::FetchSummary;
use model_manager::{ArtifactDownloader, DownloadObserver, ModelDocument, SourceRepository};
use settings::FetcherSettings;

/// Sequential fetch pipeline
pub struct ModelFetcher {
    /// Source of the model definitions
    repository: SourceRepository,

    /// Artifact downloader
    downloader: ArtifactDownloader,

    /// Resolve destinations without fetching
    dry_run: bool,
}

impl ModelFetcher {
    /// Creates a new fetch pipeline
    pub fn new(settings: &FetcherSettings) -> Result<Self> {
        settings.validate()?;

        Ok(Self {
            repository: SourceRepository::new(&settings.source),
            downloader: ArtifactDownloader::new(&settings.download)?,
            dry_run: false,
        })
    }

    /// Reports download progress to the given observer
    pub fn with_observer(mut self, observer: Arc<dyn DownloadObserver>) -> Self {
        self.downloader = self.downloader.with_observer(observer);
        self
    }

    /// Enables or disables dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Runs all stages once
    ///
    /// Acquisition, discovery, and document errors abort the run. Artifact
    /// failures are recorded in the summary and processing continues.
    pub async fn run(&self) -> Result<FetchSummary> {
        let mut summary = FetchSummary::new();

        self.repository.ensure_checkout().await?;

        let documents = self.repository.discover_documents().await?;

        for path in &documents {
            self.process_document(path, &mut summary).await?;
        }

        summary.finish();

        info!(
            "Fetch finished: {} documents, {} downloaded, {} skipped, {} failed",
            summary.documents,
            summary.downloaded(),
            summary.skipped(),
            summary.failed().len()
        );

        Ok(summary)
    }

    /// Processes a single model definition
    pub async fn process_document(&self, path: &Path, summary: &mut FetchSummary) -> Result<()> {
        info!("Processing model definition {}", path.display());

        let document = ModelDocument::load(path).await?;
        let model_name = document.name();
        let urls = document.model_urls();

        summary.documents += 1;

        if urls.is_empty() {
            warn!("No artifact URLs in {}", path.display());
            return Ok(());
        }

        info!("Model {}: {} artifact(s)", model_name, urls.len());

        for url in &urls {
            let outcome = if self.dry_run {
                self.downloader.plan(&model_name, url)
            } else {
                self.downloader.fetch(&model_name, url).await
            };

            summary.record(outcome);
        }

        Ok(())
    }
}
