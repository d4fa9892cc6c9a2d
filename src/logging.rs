//! Tracing subscriber setup for applications embedding the cube.
//!
//! The library itself only emits `tracing` events; hosts call [`init`] once
//! at startup to get formatted output.

use crate::config::LoggingConfig;
use crate::error::{CubeError, Result};
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::EnvFilter;

/// Build the filter described by `config`.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    let level: Level = config.level.parse().unwrap_or(Level::INFO);
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(config.filter.as_deref().unwrap_or(""))
}

/// Install a global fmt subscriber with RFC 3339 UTC timestamps.
/// Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_timer(ChronoUtc::rfc_3339())
        .with_target(true)
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .try_init()
        .map_err(|e| CubeError::Config(format!("failed to install tracing subscriber: {}", e)))
}
