//! Per-invocation plugin storage.
//!
//! The storage resolves the configured specs once, fixes the load order
//! (Oh-My-Zsh first, then the specs as listed) and tracks what each entry
//! needs. Batch passes run every entry concurrently and wait for all of them;
//! a failing entry records its error and never stops the others.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{debug, error, info};

use crate::error::{PluginError, PluginResult};
use crate::factory::{PluginFactory, Resolution};
use crate::git::{GitOptions, GitPlugin, RequiredRevision};
use crate::plugin::{Installation, LoadScript, Plugin, UpdateCheck};

/// Directory under the zpm root that holds plugins.
pub const PLUGINS_DIR: &str = "Plugins";

/// Lifecycle state of a storage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Resolved, nothing checked yet.
    ConfigLoaded,
    /// Present and current, or nothing to install.
    Installed,
    /// Absent and installable.
    NeedInstall,
    /// A newer revision was found.
    NeedUpdate,
    /// The last check or install failed; see [`PluginEntry::error`].
    CheckError,
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ConfigLoaded => "loaded",
            Self::Installed => "installed",
            Self::NeedInstall => "not installed",
            Self::NeedUpdate => "update available",
            Self::CheckError => "error",
        })
    }
}

/// One plugin and what the storage knows about it.
#[derive(Debug)]
pub struct PluginEntry {
    name: String,
    plugin: Plugin,
    state: PluginState,
    error: Option<PluginError>,
    pending_update: Option<String>,
}

impl PluginEntry {
    /// Wrap a freshly resolved plugin.
    #[must_use]
    pub fn new(name: impl Into<String>, plugin: Plugin) -> Self {
        Self {
            name: name.into(),
            plugin,
            state: PluginState::ConfigLoaded,
            error: None,
            pending_update: None,
        }
    }

    /// The spec string this entry came from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The plugin.
    #[must_use]
    pub fn plugin(&self) -> &Plugin {
        &self.plugin
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PluginState {
        self.state
    }

    /// The error behind [`PluginState::CheckError`].
    #[must_use]
    pub fn error(&self) -> Option<&PluginError> {
        self.error.as_ref()
    }

    /// Message describing the update behind [`PluginState::NeedUpdate`].
    #[must_use]
    pub fn pending_update(&self) -> Option<&str> {
        self.pending_update.as_deref()
    }

    fn fail(&mut self, err: PluginError, action: &'static str) {
        error!(plugin = %self.name, error = %err, "Failed {action}");
        self.state = PluginState::CheckError;
        self.error = Some(err.for_entry(&self.name, action));
        self.pending_update = None;
    }

    async fn check_update(&mut self, offline: bool) {
        match self.plugin.check_update(offline).await {
            Ok(UpdateCheck::NotUpgradable) => {
                debug!(plugin = %self.name, "Not upgradable");
                self.state = PluginState::Installed;
            },
            Ok(UpdateCheck::UpToDate) => {
                debug!(plugin = %self.name, "Up to date");
                self.state = PluginState::Installed;
            },
            Ok(UpdateCheck::Available(message)) => {
                let line = format!("update available for {}: {message}", self.name);
                info!("{line}");
                self.state = PluginState::NeedUpdate;
                self.pending_update = Some(line);
            },
            Err(e) if e.is_not_installed() => {
                info!(plugin = %self.name, "Not installed");
                self.state = PluginState::NeedInstall;
            },
            Err(e) => self.fail(e, "checking"),
        }
    }

    fn check_install(&mut self) {
        match self.plugin.is_installed() {
            Ok(Installation::Missing) => {
                info!(plugin = %self.name, "Not installed");
                self.state = PluginState::NeedInstall;
                self.error = None;
                self.pending_update = None;
            },
            Ok(Installation::Installed | Installation::NotInstallable) => {},
            Err(e) => self.fail(e, "checking"),
        }
    }

    async fn install(&mut self) {
        if self.state != PluginState::NeedInstall {
            return;
        }
        match self.plugin.install_update().await {
            Ok(()) => {
                info!(plugin = %self.name, "Installed");
                self.state = PluginState::Installed;
            },
            Err(e) => self.fail(e, "installing"),
        }
    }

    async fn update(&mut self) {
        if self.state != PluginState::NeedUpdate {
            return;
        }
        match self.plugin.install_update().await {
            Ok(()) => {
                info!(plugin = %self.name, "Installed update");
                self.state = PluginState::Installed;
                self.pending_update = None;
            },
            Err(e) => self.fail(e, "updating"),
        }
    }
}

/// All plugins of one invocation, in load order.
#[derive(Debug)]
pub struct PluginStorage {
    root: PathBuf,
    entries: Vec<PluginEntry>,
}

impl PluginStorage {
    /// Resolve `specs` into entries installed under `<root>/Plugins`.
    ///
    /// A spec listed more than once yields one entry, and so do git specs
    /// that clone into the same directory at the same revision.
    ///
    /// # Errors
    ///
    /// Fails on the first spec that cannot be resolved, and with
    /// [`PluginError::InvalidSpec`] when two specs need one clone at different
    /// revisions.
    pub fn new<S: AsRef<str>>(root: &Path, specs: &[S], options: GitOptions) -> PluginResult<Self> {
        let plugins_root = root.join(PLUGINS_DIR);
        let mut factory = PluginFactory::new(&plugins_root, options);
        let mut seen = HashSet::new();
        let mut clones: HashMap<PathBuf, (String, RequiredRevision)> = HashMap::new();
        let mut entries = Vec::with_capacity(specs.len());

        for spec in specs {
            let spec = spec.as_ref();
            if !seen.insert(spec) {
                debug!(spec, "Skipping duplicate spec");
                continue;
            }
            let Resolution::Plugin(plugin) = factory.make_plugin(spec)? else {
                continue;
            };
            if let Some(git) = plugin.git()
                && !claim_clone(&mut clones, spec, git)?
            {
                continue;
            }
            entries.push(PluginEntry::new(spec, plugin));
        }

        if let Some((name, omz)) = factory.into_dependency() {
            // Oh-My-Zsh sources its own library; a plain clone of it cannot
            // share the directory.
            if let Some((other, _)) = clones.get(omz.path()) {
                return Err(PluginError::InvalidSpec {
                    spec: other.clone(),
                    reason: format!("clones into the same directory as '{name}'"),
                });
            }
            entries.insert(0, PluginEntry::new(name, Plugin::OhMyZsh(omz)));
        }

        Ok(Self {
            root: plugins_root,
            entries,
        })
    }

    /// Where plugins are installed.
    #[must_use]
    pub fn plugins_root(&self) -> &Path {
        &self.root
    }

    /// Entries in load order.
    #[must_use]
    pub fn entries(&self) -> &[PluginEntry] {
        &self.entries
    }

    /// Entry names in load order.
    #[must_use]
    pub fn load_order(&self) -> Vec<&str> {
        self.entries.iter().map(PluginEntry::name).collect()
    }

    /// Look an entry up by spec string.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PluginEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Check every entry for updates and missing installs.
    pub async fn check_updates(&mut self, offline: bool) {
        join_all(self.entries.iter_mut().map(|e| e.check_update(offline))).await;
    }

    /// Mark missing plugins for installation without touching the network.
    pub fn check_installs(&mut self) {
        for entry in &mut self.entries {
            entry.check_install();
        }
    }

    /// Apply every update found by [`PluginStorage::check_updates`].
    pub async fn update_all(&mut self) {
        join_all(self.entries.iter_mut().map(PluginEntry::update)).await;
    }

    /// Install every plugin marked as missing.
    pub async fn install_all(&mut self) {
        join_all(self.entries.iter_mut().map(PluginEntry::install)).await;
    }

    /// Whether any entry has an update waiting.
    #[must_use]
    pub fn has_updates(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.state == PluginState::NeedUpdate)
    }

    /// Whether any entry needs installing.
    #[must_use]
    pub fn has_installs(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.state == PluginState::NeedInstall)
    }

    /// Entries whose last operation failed.
    pub fn failures(&self) -> impl Iterator<Item = &PluginEntry> {
        self.entries
            .iter()
            .filter(|e| e.state == PluginState::CheckError)
    }

    /// Load every entry, in load order.
    #[must_use]
    pub fn load_scripts(&self) -> Vec<(&str, PluginResult<LoadScript>)> {
        self.entries
            .iter()
            .map(|e| (e.name(), e.plugin.load()))
            .collect()
    }
}

/// Record that `spec` owns the clone of `git`. Returns `false` if an earlier
/// spec already clones the same directory at the same revision.
fn claim_clone(
    clones: &mut HashMap<PathBuf, (String, RequiredRevision)>,
    spec: &str,
    git: &GitPlugin,
) -> PluginResult<bool> {
    match clones.entry(git.path().to_path_buf()) {
        Entry::Vacant(slot) => {
            slot.insert((spec.to_string(), git.revision().clone()));
            Ok(true)
        },
        Entry::Occupied(slot) => {
            let (other, revision) = slot.get();
            if revision != git.revision() {
                return Err(PluginError::InvalidSpec {
                    spec: spec.to_string(),
                    reason: format!(
                        "clones into the same directory as '{other}' at revision {revision}"
                    ),
                });
            }
            debug!(spec, same_as = %other, "Skipping spec sharing a clone");
            Ok(false)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ohmyzsh::OH_MY_ZSH;

    fn storage(root: &Path, specs: &[&str]) -> PluginStorage {
        PluginStorage::new(root, specs, GitOptions::default()).unwrap()
    }

    #[test]
    fn oh_my_zsh_loads_first() {
        let tmp = tempfile::tempdir().unwrap();
        let s = storage(
            tmp.path(),
            &["dir:a", "oh-my-zsh:plugin:git", "file:b.zsh", "oh-my-zsh:theme:agnoster"],
        );
        assert_eq!(
            s.load_order(),
            vec![
                OH_MY_ZSH,
                "dir:a",
                "oh-my-zsh:plugin:git",
                "file:b.zsh",
                "oh-my-zsh:theme:agnoster"
            ]
        );
        assert_eq!(s.plugins_root(), tmp.path().join("Plugins"));
    }

    #[test]
    fn explicit_oh_my_zsh_keeps_its_name() {
        let tmp = tempfile::tempdir().unwrap();
        let s = storage(tmp.path(), &["dir:a", "oh-my-zsh@stable", "oh-my-zsh:plugin:git"]);
        assert_eq!(
            s.load_order(),
            vec!["oh-my-zsh@stable", "dir:a", "oh-my-zsh:plugin:git"]
        );
        assert_eq!(s.entries().iter().filter(|e| e.plugin().kind() == "oh-my-zsh").count(), 1);
    }

    #[test]
    fn no_oh_my_zsh_unless_required() {
        let tmp = tempfile::tempdir().unwrap();
        let s = storage(tmp.path(), &["dir:a", "dir:a", "file:b.zsh"]);
        assert_eq!(s.load_order(), vec!["dir:a", "file:b.zsh"]);
        assert!(s.get(OH_MY_ZSH).is_none());
        assert_eq!(s.get("dir:a").unwrap().state(), PluginState::ConfigLoaded);
    }

    #[test]
    fn resolution_errors_abort() {
        let tmp = tempfile::tempdir().unwrap();
        let err = PluginStorage::new(tmp.path(), &["dir:a", "nope"], GitOptions::default())
            .unwrap_err();
        assert!(matches!(err, PluginError::UnknownPluginType(ref s) if s == "nope"));
    }

    #[tokio::test]
    async fn check_pass_classifies_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let plugins = tmp.path().join("Plugins");
        std::fs::create_dir_all(plugins.join("present")).unwrap();
        std::fs::write(plugins.join("present").join("x.plugin.zsh"), "").unwrap();

        let mut s = storage(
            tmp.path(),
            &["dir:present", "dir:absent", "github:org/repo"],
        );
        s.check_updates(true).await;

        assert_eq!(s.get("dir:present").unwrap().state(), PluginState::Installed);
        assert_eq!(s.get("dir:absent").unwrap().state(), PluginState::Installed);
        assert_eq!(s.get("github:org/repo").unwrap().state(), PluginState::NeedInstall);
        assert!(s.has_installs());
        assert!(!s.has_updates());
        assert_eq!(s.failures().count(), 0);

        let scripts = s.load_scripts();
        assert_eq!(scripts.len(), 3);
        assert!(scripts[0].1.is_ok());
        assert!(matches!(scripts[1].1, Err(PluginError::NotInstalled)));
        assert!(matches!(scripts[2].1, Err(PluginError::NotInstalled)));
    }

    #[tokio::test]
    async fn check_pass_records_each_outcome() {
        let tmp = tempfile::tempdir().unwrap();
        let plugins = tmp.path().join("Plugins");
        std::fs::create_dir_all(plugins.join("present")).unwrap();

        let broken = plugins.join("example.com").join("org").join("broken");
        std::fs::create_dir_all(&broken).unwrap();
        let init = std::process::Command::new("git")
            .args(["init", "--quiet"])
            .current_dir(&broken)
            .status();
        if !init.is_ok_and(|status| status.success()) {
            return;
        }
        std::fs::write(broken.join(".git").join("HEAD"), "ref: refs/heads/gone\n").unwrap();

        let broken_spec = "git:https://example.com/org/broken.git";
        let mut s = storage(
            tmp.path(),
            &["dir:present", broken_spec, "github:org/missing"],
        );
        s.check_updates(false).await;

        assert_eq!(s.get("dir:present").unwrap().state(), PluginState::Installed);
        assert_eq!(s.get("github:org/missing").unwrap().state(), PluginState::NeedInstall);

        let failed = s.get(broken_spec).unwrap();
        assert_eq!(failed.state(), PluginState::CheckError);
        assert!(matches!(
            failed.error().unwrap(),
            PluginError::EntryFailed { action: "checking", name, .. } if name == broken_spec
        ));
        assert_eq!(s.failures().count(), 1);
        assert!(!s.has_updates());
    }

    #[test]
    fn specs_sharing_a_clone() {
        let tmp = tempfile::tempdir().unwrap();

        // Same directory, same revision: one entry.
        let s = storage(
            tmp.path(),
            &["github:org/repo", "git:https://github.com/org/repo.git", "github:org/repo@HEAD"],
        );
        assert_eq!(s.load_order(), vec!["github:org/repo"]);

        let err = PluginStorage::new(
            tmp.path(),
            &["github:org/repo", "github:org/repo@v1"],
            GitOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PluginError::InvalidSpec { ref spec, .. } if spec == "github:org/repo@v1"));

        for specs in [
            ["oh-my-zsh", "github:robbyrussell/oh-my-zsh"],
            ["github:robbyrussell/oh-my-zsh", "oh-my-zsh:plugin:git"],
        ] {
            let err = PluginStorage::new(tmp.path(), &specs, GitOptions::default()).unwrap_err();
            assert!(
                matches!(err, PluginError::InvalidSpec { ref spec, .. } if spec == "github:robbyrussell/oh-my-zsh"),
                "{specs:?}"
            );
        }
    }

    #[test]
    fn install_check_is_local() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = storage(tmp.path(), &["file:a.zsh", "github:org/repo"]);
        s.check_installs();
        assert_eq!(s.get("file:a.zsh").unwrap().state(), PluginState::ConfigLoaded);
        assert_eq!(s.get("github:org/repo").unwrap().state(), PluginState::NeedInstall);
    }

    #[tokio::test]
    async fn failed_install_is_isolated() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = storage(tmp.path(), &["dir:a", "git:https://127.0.0.1:9/none.git"]);
        s.check_installs();
        s.install_all().await;

        assert_eq!(s.get("dir:a").unwrap().state(), PluginState::ConfigLoaded);
        let failed: Vec<_> = s.failures().map(PluginEntry::name).collect();
        assert_eq!(failed, vec!["git:https://127.0.0.1:9/none.git"]);

        let err = s.failures().next().unwrap().error().unwrap();
        assert!(matches!(err, PluginError::EntryFailed { action: "installing", .. }));
        assert!(!s.has_installs());
    }

    #[tokio::test]
    async fn update_pass_skips_entries_without_updates() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = storage(tmp.path(), &["github:org/repo"]);
        s.update_all().await;
        assert_eq!(s.get("github:org/repo").unwrap().state(), PluginState::ConfigLoaded);
        assert_eq!(s.failures().count(), 0);
    }
}
