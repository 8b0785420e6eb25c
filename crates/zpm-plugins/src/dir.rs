//! Plugins loaded from a directory.
//!
//! The directory itself goes to `fpath` so completions and autoloaded
//! functions are found. Entry points are the regular files directly inside it
//! named `*.plugin.zsh`, followed by the `*.zsh-theme` files, each group in
//! lexical order.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{PluginError, PluginResult};
use crate::plugin::{Installation, Load, LoadScript};

/// Entry point patterns, in the order their matches are sourced.
const ENTRYPOINT_PATTERNS: [&str; 2] = ["*.plugin.zsh", "*.zsh-theme"];

/// A directory of zsh plugin and theme files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirPlugin {
    path: PathBuf,
}

impl DirPlugin {
    /// Create a directory plugin rooted at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The plugin directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    fn entrypoints(&self) -> PluginResult<Vec<PathBuf>> {
        let globs = entrypoint_globs()?;
        let mut groups: [Vec<PathBuf>; ENTRYPOINT_PATTERNS.len()] = Default::default();

        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            let path = entry.path();
            // Follows symlinks, so a linked entry point still counts.
            let Ok(metadata) = std::fs::metadata(&path) else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let Some(group) = globs
                .matches(entry.file_name())
                .into_iter()
                .min()
                .and_then(|idx| groups.get_mut(idx))
            else {
                continue;
            };
            group.push(path);
        }

        Ok(groups
            .into_iter()
            .flat_map(|mut group| {
                group.sort();
                group
            })
            .collect())
    }
}

fn entrypoint_globs() -> PluginResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in ENTRYPOINT_PATTERNS {
        let glob = Glob::new(pattern).map_err(std::io::Error::other)?;
        builder.add(glob);
    }
    Ok(builder.build().map_err(std::io::Error::other)?)
}

impl Load for DirPlugin {
    fn load(&self) -> PluginResult<LoadScript> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PluginError::NotInstalled);
            },
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_dir() {
            return Err(PluginError::NotADirectory(self.path.clone()));
        }

        let exec = self
            .entrypoints()?
            .iter()
            .map(|path| format!("source {}", path.display()))
            .collect();

        Ok(LoadScript {
            fpath: vec![self.path.display().to_string()],
            exec,
        })
    }

    fn is_installed(&self) -> PluginResult<Installation> {
        Ok(Installation::NotInstallable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILES: [&str; 3] = ["b.plugin.zsh", "a.plugin.zsh", "c.zsh-theme"];

    #[test]
    fn load_sources_entrypoints_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("plugin");
        std::fs::create_dir_all(&dir).unwrap();
        for name in FILES {
            std::fs::write(dir.join(name), "").unwrap();
        }
        std::fs::write(dir.join("README.md"), "").unwrap();
        std::fs::write(dir.join("helper.zsh"), "").unwrap();

        let script = DirPlugin::new(&dir).load().unwrap();
        assert_eq!(script.fpath, vec![dir.display().to_string()]);
        assert_eq!(
            script.exec,
            vec![
                format!("source {}", dir.join("a.plugin.zsh").display()),
                format!("source {}", dir.join("b.plugin.zsh").display()),
                format!("source {}", dir.join("c.zsh-theme").display()),
            ]
        );
    }

    #[test]
    fn themes_come_after_plugins() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("aaa.zsh-theme"), "").unwrap();
        std::fs::write(tmp.path().join("zzz.plugin.zsh"), "").unwrap();

        let script = DirPlugin::new(tmp.path()).load().unwrap();
        assert!(script.exec[0].ends_with("zzz.plugin.zsh"));
        assert!(script.exec[1].ends_with("aaa.zsh-theme"));
    }

    #[test]
    fn matching_subdirectories_are_not_sourced() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("plugin");
        for name in FILES {
            std::fs::create_dir_all(dir.join(name)).unwrap();
        }

        let script = DirPlugin::new(&dir).load().unwrap();
        assert_eq!(script.fpath, vec![dir.display().to_string()]);
        assert!(script.exec.is_empty());
    }

    #[test]
    fn missing_directory_is_not_installed() {
        let tmp = tempfile::tempdir().unwrap();
        let err = DirPlugin::new(tmp.path().join("plugin")).load().unwrap_err();
        assert!(matches!(err, PluginError::NotInstalled));
    }

    #[test]
    fn file_instead_of_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plugin");
        std::fs::write(&path, "").unwrap();

        let err = DirPlugin::new(&path).load().unwrap_err();
        assert!(matches!(err, PluginError::NotADirectory(p) if p == path));
    }
}
