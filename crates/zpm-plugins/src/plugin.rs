//! Plugin capability contract and the closed set of plugin types.

use async_trait::async_trait;

use crate::dir::DirPlugin;
use crate::error::{PluginError, PluginResult};
use crate::file::FilePlugin;
use crate::git::GitPlugin;
use crate::ohmyzsh::OhMyZsh;

/// What a plugin contributes to the shell: directories for `fpath` and the
/// lines to execute, both in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadScript {
    /// Directories added to the function search path.
    pub fpath: Vec<String>,
    /// Shell statements that activate the plugin.
    pub exec: Vec<String>,
}

impl LoadScript {
    /// Append another script after this one.
    pub fn extend(&mut self, other: Self) {
        self.fpath.extend(other.fpath);
        self.exec.extend(other.exec);
    }
}

/// Outcome of a successful update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    /// The plugin type has no notion of updates.
    NotUpgradable,
    /// The installed revision is the required one.
    UpToDate,
    /// An update was found; the message describes it.
    Available(String),
}

/// Local installation state, determined without network access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installation {
    /// Present on the drive.
    Installed,
    /// Absent, and zpm knows how to install it.
    Missing,
    /// The plugin type is never installed by zpm.
    NotInstallable,
}

/// Capabilities every plugin type has.
pub trait Load: Send + Sync {
    /// Produce the `fpath` entries and exec statements for this plugin.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotInstalled`] when the backing resource is
    /// absent.
    fn load(&self) -> PluginResult<LoadScript>;

    /// Check the local installation state. Never touches the network.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn is_installed(&self) -> PluginResult<Installation>;
}

/// Capabilities of plugins that track a remote revision.
///
/// `check_update` is read-mostly: it may fetch but never touches the working
/// tree. `install_update` is the only operation that mutates the drive and
/// must follow a check that returned [`UpdateCheck::Available`] or
/// [`PluginError::NotInstalled`].
#[async_trait]
pub trait Upgrade: Load {
    /// Determine whether a newer revision exists.
    ///
    /// With `offline` set the remote is not contacted and the check runs
    /// against whatever the last fetch left behind.
    async fn check_update(&mut self, offline: bool) -> PluginResult<UpdateCheck>;

    /// Install the plugin if absent, or apply the update found by the last
    /// check.
    async fn install_update(&mut self) -> PluginResult<()>;
}

/// A resolved plugin.
#[derive(Debug)]
pub enum Plugin {
    /// A single file that gets sourced.
    File(FilePlugin),
    /// A directory of plugin/theme files. Also used for Oh-My-Zsh plugins
    /// and themes.
    Dir(DirPlugin),
    /// A git clone, generic or from GitHub.
    Git(GitPlugin),
    /// The Oh-My-Zsh framework.
    OhMyZsh(OhMyZsh),
}

impl Plugin {
    fn as_load(&self) -> &dyn Load {
        match self {
            Self::File(p) => p,
            Self::Dir(p) => p,
            Self::Git(p) => p,
            Self::OhMyZsh(p) => p,
        }
    }

    /// The upgrade capability, if this plugin type has one.
    pub fn upgradable(&mut self) -> Option<&mut dyn Upgrade> {
        match self {
            Self::Git(p) => Some(p),
            Self::OhMyZsh(p) => Some(p),
            Self::File(_) | Self::Dir(_) => None,
        }
    }

    /// The git clone behind this plugin, if any.
    #[must_use]
    pub fn git(&self) -> Option<&GitPlugin> {
        match self {
            Self::Git(p) => Some(p),
            Self::OhMyZsh(p) => Some(p.git()),
            Self::File(_) | Self::Dir(_) => None,
        }
    }

    /// Short name of the plugin type, for listings.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Dir(_) => "dir",
            Self::Git(p) if p.remote().is_github() => "github",
            Self::Git(_) => "git",
            Self::OhMyZsh(_) => "oh-my-zsh",
        }
    }

    /// See [`Load::load`].
    ///
    /// # Errors
    ///
    /// Propagates the variant's load error.
    pub fn load(&self) -> PluginResult<LoadScript> {
        self.as_load().load()
    }

    /// See [`Load::is_installed`].
    ///
    /// # Errors
    ///
    /// Propagates the variant's error.
    pub fn is_installed(&self) -> PluginResult<Installation> {
        self.as_load().is_installed()
    }

    /// See [`Upgrade::check_update`]. Plugins without the capability report
    /// [`UpdateCheck::NotUpgradable`].
    ///
    /// # Errors
    ///
    /// Propagates the variant's check error.
    pub async fn check_update(&mut self, offline: bool) -> PluginResult<UpdateCheck> {
        match self.upgradable() {
            Some(p) => p.check_update(offline).await,
            None => Ok(UpdateCheck::NotUpgradable),
        }
    }

    /// See [`Upgrade::install_update`].
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotUpgradable`] for plugins without the
    /// capability, otherwise propagates the variant's error.
    pub async fn install_update(&mut self) -> PluginResult<()> {
        match self.upgradable() {
            Some(p) => p.install_update().await,
            None => Err(PluginError::NotUpgradable),
        }
    }
}
