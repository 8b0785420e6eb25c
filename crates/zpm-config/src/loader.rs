//! Config file discovery and loading.
//!
//! 1. Resolve the file: an explicit path, or `~/.zpm.toml`
//! 2. Write the embedded defaults there if the file does not exist
//! 3. Parse it (missing keys take their defaults)
//! 4. Fill home-relative defaults and validate

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration, also written out for new users.
pub const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Name of the user config file in the home directory.
pub const CONFIG_FILE_NAME: &str = ".zpm.toml";

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// A loaded configuration and where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The validated configuration.
    pub config: Config,
    /// The file it was read from.
    pub path: PathBuf,
    /// The file did not exist and was written from the defaults.
    pub created: bool,
}

/// Load the configuration from `path`, or from `~/.zpm.toml`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the home directory is unknown, or the file
/// cannot be created, read, parsed or validated.
pub fn load(path: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let home = home_directory()?;
    let path = path.map_or_else(|| home.join(CONFIG_FILE_NAME), Path::to_path_buf);
    load_or_create(&path, &home)
}

/// Load `path`, creating it from the defaults first if it does not exist.
/// `home` resolves `~` and the default root.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be created, read, parsed or
/// validated.
pub fn load_or_create(path: &Path, home: &Path) -> ConfigResult<ResolvedConfig> {
    let mut created = false;
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            write_defaults(path)?;
            created = true;
            DEFAULTS_TOML.to_owned()
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    // Check size after reading to avoid TOCTOU between stat and read.
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    validate::validate(&mut config, home)?;
    debug!(path = %path.display(), plugins = config.plugins.len(), "Loaded config");
    Ok(ResolvedConfig {
        config,
        path: path.to_path_buf(),
        created,
    })
}

fn write_defaults(path: &Path) -> ConfigResult<()> {
    let write_err = |e| ConfigError::WriteError {
        path: path.display().to_string(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, DEFAULTS_TOML).map_err(write_err)
}

/// Determine the user's home directory.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] if it cannot be determined.
pub fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}
