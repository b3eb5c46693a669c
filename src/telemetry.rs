// src/telemetry.rs
// =============================================================================
// Sets up logging for the binary.
//
// RUST_LOG wins when it is set (e.g. RUST_LOG=edupost_crawler=debug);
// otherwise EDUCATIONPOSTS_LOG, otherwise "info". Log lines go to stderr so
// `--json` output on stdout stays machine-readable.
// =============================================================================

use crate::config::TelemetryConfig;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}': {source}")]
    EnvFilter { value: String, source: ParseError },

    #[error("could not install log subscriber: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|source| {
            TelemetryError::EnvFilter {
                value: config.log_level.clone(),
                source,
            }
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
