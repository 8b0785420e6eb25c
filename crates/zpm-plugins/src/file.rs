//! Plugins loaded from a single file.

use std::path::{Path, PathBuf};

use crate::error::{PluginError, PluginResult};
use crate::plugin::{Installation, Load, LoadScript};

/// A file that is sourced as-is. Contributes nothing to `fpath`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlugin {
    path: PathBuf,
}

impl FilePlugin {
    /// Create a file plugin for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The sourced file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Load for FilePlugin {
    fn load(&self) -> PluginResult<LoadScript> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PluginError::NotInstalled);
            },
            Err(e) => return Err(e.into()),
        };
        if metadata.is_dir() {
            return Err(PluginError::NotAFile(self.path.clone()));
        }

        Ok(LoadScript {
            fpath: Vec::new(),
            exec: vec![format!("source {}", self.path.display())],
        })
    }

    fn is_installed(&self) -> PluginResult<Installation> {
        Ok(Installation::NotInstallable)
    }
}
