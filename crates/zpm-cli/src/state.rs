//! Files zpm keeps in its root directory between runs: the load script cache
//! and the time of the last update check.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

/// Cached output of `zpm load`.
pub(crate) const CACHE_FILE: &str = ".zpm_cache.zsh";

/// RFC 3339 time of the last update check.
pub(crate) const LAST_UPDATE_FILE: &str = ".lastupdate";

/// State files under the zpm root.
#[derive(Debug, Clone)]
pub(crate) struct RootState {
    root: PathBuf,
}

impl RootState {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn cache_path(&self) -> PathBuf {
        self.root.join(CACHE_FILE)
    }

    fn last_update_path(&self) -> PathBuf {
        self.root.join(LAST_UPDATE_FILE)
    }

    /// The cache file, if one exists and is a regular file.
    pub(crate) fn cached_script(&self) -> Option<PathBuf> {
        let path = self.cache_path();
        path.is_file().then_some(path)
    }

    /// Replace the cache with `script`.
    pub(crate) fn write_cache(&self, script: &str) -> Result<()> {
        let path = self.cache_path();
        std::fs::write(&path, script)
            .with_context(|| format!("cannot write cache {}", path.display()))
    }

    /// Remove the cache so the next `zpm load` renders afresh.
    pub(crate) fn invalidate_cache(&self) -> Result<()> {
        debug!("Invalidating cache");
        remove_if_present(&self.cache_path())
    }

    /// When updates were last checked. `None` if never.
    pub(crate) fn last_update(&self) -> Result<Option<DateTime<Utc>>> {
        let path = self.last_update_path();
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("while reading {}", path.display()));
            },
        };
        let time = DateTime::parse_from_rfc3339(data.trim())
            .with_context(|| format!("failed to parse time in {}", path.display()))?;
        Ok(Some(time.with_timezone(&Utc)))
    }

    /// Record an update check at `time`.
    pub(crate) fn record_update(&self, time: DateTime<Utc>) -> Result<()> {
        let path = self.last_update_path();
        std::fs::write(&path, time.to_rfc3339())
            .with_context(|| format!("cannot write {}", path.display()))
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("cannot remove {}", path.display())),
    }
}

/// Whether a check is due: never checked, or the last check is at least
/// `period` old.
pub(crate) fn update_due(last: Option<DateTime<Utc>>, now: DateTime<Utc>, period: Duration) -> bool {
    let Some(last) = last else {
        return true;
    };
    let Ok(period) = TimeDelta::from_std(period) else {
        return false;
    };
    now.signed_duration_since(last) >= period
}
