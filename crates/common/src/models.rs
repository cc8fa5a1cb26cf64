//! Common data models for Model Fetcher
//!
//! This module defines the per-artifact outcomes and the run summary shared
//! between the pipeline and the command-line front end.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Result of processing a single artifact URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactOutcome {
    /// Artifact was fetched and written to disk
    Downloaded {
        /// Source URL
        url: String,
        /// Destination path
        path: PathBuf,
        /// Number of bytes written
        bytes: u64,
    },
    /// Destination already existed, no request was made
    Skipped {
        /// Source URL
        url: String,
        /// Existing destination path
        path: PathBuf,
    },
    /// Dry run: artifact would have been fetched
    Planned {
        /// Source URL
        url: String,
        /// Destination path
        path: PathBuf,
    },
    /// Fetching the artifact failed
    Failed {
        /// Source URL
        url: String,
        /// Human-readable failure reason
        reason: String,
    },
}

impl ArtifactOutcome {
    /// Gets the URL this outcome refers to
    pub fn url(&self) -> &str {
        match self {
            ArtifactOutcome::Downloaded { url, .. }
            | ArtifactOutcome::Skipped { url, .. }
            | ArtifactOutcome::Planned { url, .. }
            | ArtifactOutcome::Failed { url, .. } => url,
        }
    }

    /// Returns true if the artifact failed
    pub fn is_failed(&self) -> bool {
        matches!(self, ArtifactOutcome::Failed { .. })
    }
}

/// Summary of one fetch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSummary {
    /// Run start timestamp
    pub started_at: DateTime<Utc>,
    /// Run finish timestamp
    pub finished_at: Option<DateTime<Utc>>,
    /// Number of documents processed
    pub documents: usize,
    /// Outcomes in processing order
    pub outcomes: Vec<ArtifactOutcome>,
}

impl FetchSummary {
    /// Creates an empty summary starting now
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            documents: 0,
            outcomes: Vec::new(),
        }
    }

    /// Records an artifact outcome
    pub fn record(&mut self, outcome: ArtifactOutcome) {
        self.outcomes.push(outcome);
    }

    /// Marks the run as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of downloaded artifacts
    pub fn downloaded(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o, ArtifactOutcome::Downloaded { .. })).count()
    }

    /// Number of skipped artifacts
    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o, ArtifactOutcome::Skipped { .. })).count()
    }

    /// Number of planned artifacts (dry run)
    pub fn planned(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o, ArtifactOutcome::Planned { .. })).count()
    }

    /// Failed outcomes
    pub fn failed(&self) -> Vec<&ArtifactOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed()).collect()
    }

    /// Returns true if any artifact failed
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(ArtifactOutcome::is_failed)
    }

    /// Total bytes written by this run
    pub fn total_bytes(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                ArtifactOutcome::Downloaded { bytes, .. } => *bytes,
                _ => 0,
            })
            .sum()
    }

    /// Wall-clock duration of the run, if finished
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.finished_at
            .and_then(|finished| (finished - self.started_at).to_std().ok())
    }
}

impl Default for FetchSummary {
    fn default() -> Self {
        Self::new()
    }
}
