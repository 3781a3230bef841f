//! Telemetry error types.

use thiserror::Error;

/// Errors raised while installing a log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log configuration is invalid (bad level or directive).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A global subscriber is already installed, or the writer failed to
    /// initialize.
    #[error("Initialization error: {0}")]
    InitError(String),

    /// The log directory could not be created.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
