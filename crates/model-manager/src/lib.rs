//! Model definition discovery and artifact downloads for Model Fetcher
//!
//! This crate acquires the repository of model definitions, parses each
//! definition, and downloads the artifacts it references.

pub mod repository;
pub mod metadata;
pub mod downloader;

// Re-export commonly used types
pub use repository::SourceRepository;
pub use metadata::ModelDocument;
pub use downloader::{ArtifactDownloader, DownloadObserver, SilentObserver};
