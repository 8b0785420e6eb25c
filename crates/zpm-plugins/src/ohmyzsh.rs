//! The Oh-My-Zsh framework and the plugins and themes it ships.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::dir::DirPlugin;
use crate::error::PluginResult;
use crate::git::{GitOptions, GitPlugin, GitRemote, RequiredRevision};
use crate::plugin::{Installation, Load, LoadScript, Upgrade, UpdateCheck};

/// Name of the storage entry for an implicitly required Oh-My-Zsh.
pub const OH_MY_ZSH: &str = "oh-my-zsh";

const ACCOUNT: &str = "robbyrussell";
const REPO: &str = "oh-my-zsh";

/// A clone of the Oh-My-Zsh repository. Loading it also sources every
/// library file under `lib/`.
#[derive(Debug)]
pub struct OhMyZsh {
    git: GitPlugin,
}

impl OhMyZsh {
    /// Create the framework plugin under `plugins_root`.
    #[must_use]
    pub fn new(plugins_root: &Path, revision: RequiredRevision, options: GitOptions) -> Self {
        let remote = GitRemote::GitHub {
            account: ACCOUNT.to_string(),
            repo: REPO.to_string(),
        };
        let path = plugins_root.join(remote.relative_path());
        Self {
            git: GitPlugin::new(path, remote, revision, options),
        }
    }

    /// The clone location.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.git.path()
    }

    /// The underlying git plugin.
    #[must_use]
    pub fn git(&self) -> &GitPlugin {
        &self.git
    }

    /// Require a different revision.
    pub fn set_revision(&mut self, revision: RequiredRevision) {
        self.git.set_revision(revision);
    }

    /// A plugin bundled with Oh-My-Zsh, `plugins/<name>`.
    #[must_use]
    pub fn load_plugin(&self, name: &str) -> DirPlugin {
        DirPlugin::new(self.bundled("plugins", name))
    }

    /// A theme bundled with Oh-My-Zsh, `themes/<name>`.
    #[must_use]
    pub fn load_theme(&self, name: &str) -> DirPlugin {
        DirPlugin::new(self.bundled("themes", name))
    }

    fn bundled(&self, kind: &str, name: &str) -> PathBuf {
        self.path().join(kind).join(name)
    }
}

impl Load for OhMyZsh {
    fn load(&self) -> PluginResult<LoadScript> {
        let mut script = self.git.load()?;
        script.exec.push(format!(
            "for config_file ({}/lib/*.zsh); do source $config_file; done",
            self.path().display()
        ));
        Ok(script)
    }

    fn is_installed(&self) -> PluginResult<Installation> {
        self.git.is_installed()
    }
}

#[async_trait]
impl Upgrade for OhMyZsh {
    async fn check_update(&mut self, offline: bool) -> PluginResult<UpdateCheck> {
        self.git.check_update(offline).await
    }

    async fn install_update(&mut self) -> PluginResult<()> {
        self.git.install_update().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;

    #[test]
    fn layout() {
        let omz = OhMyZsh::new(
            Path::new("/zpm/Plugins"),
            RequiredRevision::default(),
            GitOptions::default(),
        );
        assert_eq!(
            omz.path(),
            Path::new("/zpm/Plugins/github.com/robbyrussell/oh-my-zsh")
        );
        assert_eq!(
            omz.load_plugin("git").path(),
            Path::new("/zpm/Plugins/github.com/robbyrussell/oh-my-zsh/plugins/git")
        );
        assert_eq!(
            omz.load_theme("robbyrussell").path(),
            Path::new("/zpm/Plugins/github.com/robbyrussell/oh-my-zsh/themes/robbyrussell")
        );
        assert_eq!(omz.git().remote().url(), "https://github.com/robbyrussell/oh-my-zsh");
    }

    #[test]
    fn load_sources_library_last() {
        let tmp = tempfile::tempdir().unwrap();
        let omz = OhMyZsh::new(tmp.path(), RequiredRevision::default(), GitOptions::default());
        assert!(matches!(omz.load(), Err(PluginError::NotInstalled)));
        assert_eq!(omz.is_installed().unwrap(), Installation::Missing);

        std::fs::create_dir_all(omz.path().join(".git")).unwrap();
        std::fs::write(omz.path().join("custom.plugin.zsh"), "").unwrap();

        let script = omz.load().unwrap();
        assert_eq!(script.fpath, vec![omz.path().display().to_string()]);
        assert_eq!(
            script.exec,
            vec![
                format!("source {}", omz.path().join("custom.plugin.zsh").display()),
                format!(
                    "for config_file ({}/lib/*.zsh); do source $config_file; done",
                    omz.path().display()
                ),
            ]
        );
    }
}
