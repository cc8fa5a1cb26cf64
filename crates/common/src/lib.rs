//! Common utilities and types for Model Fetcher
//! 
//! This crate provides shared functionality used across the Model Fetcher workspace,
//! including error types, download outcome models, and formatting helpers.

pub mod error;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use error::{Error, Result};
pub use models::*;
