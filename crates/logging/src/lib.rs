//! Logging for Model Fetcher
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` takes precedence over
//! the configured level so a single run can be made more verbose without
//! touching the configuration file.

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use common::error::Error;
use settings::{LogFormat, LoggingSettings};

/// Builds the filter for the given settings
pub fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&settings.level).map_err(|e| {
        Error::Config(format!("Invalid log level '{}': {}", settings.level, e)).into()
    })
}

/// Initializes logging
///
/// Returns `Ok(false)` if a global subscriber was already installed, which
/// happens when several tests in one process set up logging.
pub fn init_logging(settings: &LoggingSettings) -> Result<bool> {
    let filter = build_filter(settings)?;

    let installed = match settings.format {
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .try_init()
            .is_ok(),
    };

    if installed {
        debug!("Logging initialized: level={}, format={}", settings.level, settings.format);
    }

    Ok(installed)
}
