//! Configuration management for Model Fetcher
//!
//! This crate provides the settings consumed by the fetch pipeline, layered from
//! built-in defaults, an optional configuration file, and the environment.

pub mod schema;
pub mod manager;

// Re-export commonly used types
pub use schema::{FetcherSettings, SourceSettings, DownloadSettings, LoggingSettings, LogFormat};
pub use manager::SettingsLoader;
