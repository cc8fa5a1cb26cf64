//! Error types for the common crate
//!
//! This module defines the common error types used throughout the Model Fetcher workspace.

use thiserror::Error;

/// Result type for Model Fetcher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for Model Fetcher operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Model definition document could not be used
    #[error("Document error: {0}")]
    Document(String),

    /// Source repository could not be acquired
    #[error("Source error: {0}")]
    Source(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Invalid argument error
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Returns true if the error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Returns true if the error came from a remote service
    pub fn is_external(&self) -> bool {
        matches!(self, Error::ExternalService(_))
    }
}
