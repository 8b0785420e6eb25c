//! Plugin error types.

use std::path::PathBuf;

/// Errors from plugin resolution, checks and installs.
///
/// Callers branch on the variant, never on the message: the storage maps
/// `NotInstalled` to a pending install and everything else it does not
/// recognise to a per-entry failure.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The plugin is absent from the drive. Recoverable by installing it.
    #[error("not installed")]
    NotInstalled,

    /// The plugin type has no notion of updates.
    #[error("plugin is not upgradable")]
    NotUpgradable,

    /// The plugin type cannot be installed by zpm.
    #[error("plugin is not installable")]
    NotInstallable,

    /// The required revision exists neither on the remote nor locally.
    #[error("failed to resolve revision '{revision}'")]
    RevisionNotFound {
        /// Branch, tag or commit that was requested.
        revision: String,
    },

    /// No loader pattern matched the specification string.
    #[error("cannot parse the spec for an unknown plugin type: {0}")]
    UnknownPluginType(String),

    /// A loader matched but the captured parameters are unusable.
    #[error("invalid plugin spec '{spec}': {reason}")]
    InvalidSpec {
        /// The offending specification string.
        spec: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A directory plugin points at something that is not a directory.
    #[error("the provided path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A file plugin points at something that is not a regular file.
    #[error("the provided path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// The local clone has no readable `HEAD`.
    #[error("cannot read repository HEAD in {}: {message}", path.display())]
    HeadUnreadable {
        /// Path to the clone.
        path: PathBuf,
        /// Output of the failed git command.
        message: String,
    },

    /// `install_update` was called on an installed plugin without a prior
    /// check that found an update.
    #[error("no update available")]
    NoUpdateAvailable,

    /// A git subprocess failed.
    #[error("git {command} failed: {message}")]
    GitCommand {
        /// The git subcommand (`fetch`, `clone`, ...).
        command: String,
        /// Captured stderr, or the spawn error.
        message: String,
    },

    /// A remote operation exceeded its time budget.
    #[error("{operation} timed out after {secs}s")]
    Timeout {
        /// The operation that was cancelled.
        operation: String,
        /// The budget that was exceeded.
        secs: u64,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A per-entry failure recorded by the storage.
    #[error("while {action} {name}: {source}")]
    EntryFailed {
        /// Entry name (the spec string).
        name: String,
        /// What the storage was doing (`checking`, `installing`, `updating`).
        action: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<PluginError>,
    },
}

impl PluginError {
    /// Wrap this error with the entry it happened on.
    #[must_use]
    pub fn for_entry(self, name: impl Into<String>, action: &'static str) -> Self {
        Self::EntryFailed {
            name: name.into(),
            action,
            source: Box::new(self),
        }
    }

    /// Whether this is (or wraps) [`PluginError::NotInstalled`].
    #[must_use]
    pub fn is_not_installed(&self) -> bool {
        match self {
            Self::NotInstalled => true,
            Self::EntryFailed { source, .. } => source.is_not_installed(),
            _ => false,
        }
    }
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_wrapping_keeps_kind() {
        let err = PluginError::NotInstalled.for_entry("dir:foo", "checking");
        assert!(err.is_not_installed());
        assert_eq!(err.to_string(), "while checking dir:foo: not installed");
    }

    #[test]
    fn revision_message_names_revision() {
        let err = PluginError::RevisionNotFound {
            revision: "v1.2".into(),
        };
        assert!(err.to_string().contains("v1.2"));
        assert!(!err.is_not_installed());
    }
}
