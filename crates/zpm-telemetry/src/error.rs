//! Telemetry error types.

use thiserror::Error;

/// Errors from setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level or a directive does not parse.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A global subscriber is already installed.
    #[error("Initialization error: {0}")]
    InitError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
