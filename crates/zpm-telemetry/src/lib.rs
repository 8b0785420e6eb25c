//! Logging for zpm.
//!
//! `zpm load` prints a script that the shell sources, so log output never goes
//! to stdout: it is written to stderr or to daily-rotated files.
//!
//! ```rust,no_run
//! use zpm_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), zpm_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("zpm_plugins=trace");
//! setup_logging(&config)?;
//! tracing::info!("Logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LOG_FILE_PREFIX, LogConfig, LogFormat, LogTarget, setup_logging};
