//! Command-line interface for Model Fetcher
//!
//! This crate provides argument parsing, terminal progress bars, and the
//! end-of-run summary.

pub mod cli;
pub mod progress;
pub mod formatters;

// Re-export commonly used types
pub use cli::Cli;
pub use progress::ProgressReporter;
pub use formatters::{render_summary, write_report};
