//! Configuration for zpm.
//!
//! ```rust,no_run
//! use zpm_config::Config;
//!
//! let config = Config::load(None).unwrap().config;
//! for spec in &config.plugins {
//!     println!("{spec}");
//! }
//! ```
//!
//! The file lives at `~/.zpm.toml` unless another path is given and is created
//! with the defaults on first use. This crate has no dependencies on other
//! zpm crates; the CLI converts sections into plugin and logging options.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration defaulting and validation.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load the configuration from `path`, or from `~/.zpm.toml`, along with
    /// the file it came from.
    ///
    /// See [`loader::load`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be created, read, parsed,
    /// or fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<loader::ResolvedConfig> {
        loader::load(path)
    }

    /// Fill home-relative defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns the first validation error.
    pub fn validate(&mut self, home: &std::path::Path) -> ConfigResult<()> {
        validate::validate(self, home)
    }
}
