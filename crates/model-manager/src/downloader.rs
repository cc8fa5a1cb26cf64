//! Artifact downloader
//!
//! This module downloads the artifacts referenced by model definitions into
//! `<output_dir>/<model name>/<file name>`, one at a time. Failures are
//! reported per artifact and never abort the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{info, error, debug};

use common::error::Error;
use common::models::ArtifactOutcome;
use common::utils::{format_bytes, format_progress};
use settings::DownloadSettings;

/// Minimum interval between progress log lines
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_millis(100);

/// Suffix of in-flight downloads
const PARTIAL_SUFFIX: &str = ".part";

/// Receives progress of individual downloads
///
/// `on_start` is called once a successful response arrives. Every `on_start`
/// is followed by exactly one `on_finish`, after the artifact has been moved
/// into place or the partial file has been removed. Responses with an error
/// status produce no calls.
pub trait DownloadObserver: Send + Sync {
    /// A response arrived; `total_bytes` comes from `Content-Length`
    fn on_start(&self, _url: &str, _total_bytes: Option<u64>) {}

    /// Bytes received so far
    fn on_progress(&self, _downloaded_bytes: u64) {}

    /// The attempt ended
    fn on_finish(&self, _success: bool) {}
}

/// Observer that ignores all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl DownloadObserver for SilentObserver {}

/// Downloads model artifacts over HTTP
pub struct ArtifactDownloader {
    /// HTTP client
    client: Client,

    /// Root of the artifact tree
    output_dir: PathBuf,

    /// Write buffer size
    chunk_size: usize,

    /// Progress sink
    observer: Arc<dyn DownloadObserver>,
}

impl ArtifactDownloader {
    /// Creates a new artifact downloader
    pub fn new(settings: &DownloadSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(settings.user_agent.clone())
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs));

        if let Some(timeout) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            output_dir: settings.output_dir.clone(),
            chunk_size: settings.chunk_size.max(1),
            observer: Arc::new(SilentObserver),
        })
    }

    /// Replaces the progress observer
    pub fn with_observer(mut self, observer: Arc<dyn DownloadObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Computes where an artifact of the given model is stored
    pub fn destination(&self, model_name: &str, url: &str) -> Result<PathBuf> {
        let file_name = artifact_file_name(url).ok_or_else(|| {
            Error::InvalidArgument(format!("URL has no file name: {}", url))
        })?;

        Ok(self.output_dir.join(model_name).join(file_name))
    }

    /// Resolves what a fetch would do without touching the network
    pub fn plan(&self, model_name: &str, url: &str) -> ArtifactOutcome {
        match self.destination(model_name, url) {
            Ok(path) if path.exists() => ArtifactOutcome::Skipped { url: url.to_string(), path },
            Ok(path) => {
                info!("Would download {} -> {}", url, path.display());
                ArtifactOutcome::Planned { url: url.to_string(), path }
            }
            Err(e) => ArtifactOutcome::Failed { url: url.to_string(), reason: e.to_string() },
        }
    }

    /// Fetches one artifact unless it is already present
    pub async fn fetch(&self, model_name: &str, url: &str) -> ArtifactOutcome {
        let path = match self.destination(model_name, url) {
            Ok(path) => path,
            Err(e) => {
                error!("Download of {} failed: {}", url, e);
                return ArtifactOutcome::Failed { url: url.to_string(), reason: e.to_string() };
            }
        };

        if path.exists() {
            info!("Artifact already present, skipping: {}", path.display());
            return ArtifactOutcome::Skipped { url: url.to_string(), path };
        }

        info!("Downloading {}", url);

        match self.download_file(url, &path).await {
            Ok(bytes) => {
                info!("Saved {} ({})", path.display(), format_bytes(bytes));
                ArtifactOutcome::Downloaded { url: url.to_string(), path, bytes }
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                error!("Download of {} failed: {}", url, reason);
                ArtifactOutcome::Failed { url: url.to_string(), reason }
            }
        }
    }

    /// Downloads a file, moving it into place only once it is complete
    async fn download_file(&self, url: &str, path: &Path) -> Result<u64> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let resp = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::ExternalService(format!("Request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(Error::ExternalService(format!("HTTP {}", resp.status())).into());
        }

        let partial_path = partial_path_for(path);

        let result = match self.stream_to_file(url, resp, &partial_path).await {
            Ok(bytes) => tokio::fs::rename(&partial_path, path)
                .await
                .with_context(|| format!("Failed to move download into {}", path.display()))
                .map(|_| bytes),
            Err(e) => Err(e),
        };

        if result.is_err() {
            let _ = tokio::fs::remove_file(&partial_path).await;
        }

        self.observer.on_finish(result.is_ok());

        result
    }

    /// Streams a response body to disk through a fixed-size buffer
    async fn stream_to_file(&self, url: &str, resp: Response, path: &Path) -> Result<u64> {
        let total_size = resp.content_length();
        self.observer.on_start(url, total_size);

        let file = File::create(path)
            .await
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::with_capacity(self.chunk_size, file);

        let mut stream = resp.bytes_stream();
        let mut downloaded = 0u64;
        let mut last_update = Instant::now();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result
                .map_err(|e| Error::ExternalService(format!("Failed reading response body: {}", e)))?;

            writer.write_all(&chunk)
                .await
                .with_context(|| format!("Failed writing {}", path.display()))?;

            downloaded += chunk.len() as u64;
            self.observer.on_progress(downloaded);

            if last_update.elapsed() >= PROGRESS_LOG_INTERVAL {
                last_update = Instant::now();
                debug!(
                    "Downloading {}: {} / {} {}",
                    url,
                    format_bytes(downloaded),
                    total_size.map(format_bytes).unwrap_or_else(|| "?".to_string()),
                    format_progress(downloaded, total_size).unwrap_or_default()
                );
            }
        }

        writer.flush()
            .await
            .with_context(|| format!("Failed writing {}", path.display()))?;

        Ok(downloaded)
    }
}

/// Gets the artifact file name: everything after the last `/` of the URL
pub fn artifact_file_name(url: &str) -> Option<&str> {
    let name = url.rsplit('/').next()?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn partial_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}
