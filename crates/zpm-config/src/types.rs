//! Configuration types.
//!
//! Every section implements [`Default`] with the values of the embedded
//! `defaults.toml`, so a file that omits a section or key still yields a
//! working configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default plugin root, relative to the home directory.
pub const DEFAULT_ROOT: &str = ".zpm_plugins";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Plugin specs in load order.
    pub plugins: Vec<String>,
    /// Directory holding plugins and caches. Empty means `~/.zpm_plugins`.
    pub root: String,
    /// Log level, format and destination.
    pub logging: LoggingSection,
    /// What `zpm load` does besides printing the script.
    pub on_load: OnLoadSection,
    /// Time budgets for git operations.
    pub timeouts: TimeoutsSection,
}

impl Config {
    /// The plugin root as a path. Meaningful after validation, which makes it
    /// absolute.
    #[must_use]
    pub fn root_dir(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `error`, `warn`, `info`, `debug` or `trace`, any case.
    pub level: String,
    /// `pretty`, `compact` or `json`.
    pub format: String,
    /// Log file directory. Empty means stderr.
    pub directory: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directory: String::new(),
        }
    }
}

impl LoggingSection {
    /// The log file directory, if logging to files.
    #[must_use]
    pub fn directory(&self) -> Option<PathBuf> {
        (!self.directory.is_empty()).then(|| PathBuf::from(&self.directory))
    }
}

/// Shell startup behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnLoadSection {
    /// Install missing plugins while loading.
    pub install_missing: bool,
    /// Start a background update check when the last one is too old.
    pub check_for_updates: bool,
    /// Minimum time between update checks, e.g. `24h` or `3days`.
    pub update_check_period: String,
}

impl Default for OnLoadSection {
    fn default() -> Self {
        Self {
            install_missing: true,
            check_for_updates: true,
            update_check_period: "24h".to_owned(),
        }
    }
}

impl OnLoadSection {
    /// The parsed update check period.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is not a valid duration.
    pub fn update_check_period(&self) -> Result<Duration, humantime::DurationError> {
        humantime::parse_duration(&self.update_check_period)
    }
}

/// Timeouts for remote git operations, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsSection {
    /// Upper bound for one `git fetch`.
    pub git_fetch_secs: u64,
    /// Upper bound for one `git clone`.
    pub git_clone_secs: u64,
}

impl Default for TimeoutsSection {
    fn default() -> Self {
        Self {
            git_fetch_secs: 60,
            git_clone_secs: 300,
        }
    }
}

impl TimeoutsSection {
    /// Fetch budget.
    #[must_use]
    pub fn git_fetch(&self) -> Duration {
        Duration::from_secs(self.git_fetch_secs)
    }

    /// Clone budget.
    #[must_use]
    pub fn git_clone(&self) -> Duration {
        Duration::from_secs(self.git_clone_secs)
    }
}
