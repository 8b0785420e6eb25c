//! Turning spec strings into plugins.
//!
//! Each loader pairs an anchored regex with a constructor; the first loader
//! whose regex matches builds the plugin from the named captures. The factory
//! also owns the single Oh-My-Zsh instance that the bare `oh-my-zsh` spec and
//! every `oh-my-zsh:plugin:` / `oh-my-zsh:theme:` spec share.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dir::DirPlugin;
use crate::error::{PluginError, PluginResult};
use crate::file::FilePlugin;
use crate::git::{GitOptions, GitPlugin, GitRemote, RequiredRevision};
use crate::ohmyzsh::{OH_MY_ZSH, OhMyZsh};
use crate::plugin::Plugin;

type Params = HashMap<String, String>;
type Build = fn(&mut PluginFactory, &str, &Params) -> PluginResult<Resolution>;

struct Loader {
    regex: Regex,
    build: Build,
}

impl Loader {
    fn new(pattern: &str, build: Build) -> Self {
        Self {
            regex: Regex::new(pattern).expect("invalid regex"),
            build,
        }
    }

    /// Named captures of a match, with absent optional groups as `""`.
    fn params(&self, spec: &str) -> Option<Params> {
        let captures = self.regex.captures(spec)?;
        Some(
            self.regex
                .capture_names()
                .flatten()
                .map(|name| {
                    let value = captures.name(name).map_or("", |m| m.as_str());
                    (name.to_string(), value.to_string())
                })
                .collect(),
        )
    }
}

static LOADERS: LazyLock<Vec<Loader>> = LazyLock::new(|| {
    vec![
        Loader::new(
            r"^github:(?P<username>[a-z0-9\-]+)/(?P<repo>[a-z0-9\-]+)(@(?P<version>.+))?$",
            PluginFactory::make_github,
        ),
        Loader::new(r"^git:(?P<source>.+)$", PluginFactory::make_git),
        Loader::new(r"^dir:(?P<directory>.+)$", PluginFactory::make_dir),
        Loader::new(r"^file:(?P<filename>.+)$", PluginFactory::make_file),
        Loader::new(r"^oh-my-zsh(@(?P<version>.+))?$", PluginFactory::make_oh_my_zsh),
        Loader::new(
            r"^oh-my-zsh:plugin:(?P<name>[a-z0-9\-]+)$",
            PluginFactory::make_oh_my_zsh_plugin,
        ),
        Loader::new(
            r"^oh-my-zsh:theme:(?P<name>[a-z0-9\-]+)$",
            PluginFactory::make_oh_my_zsh_theme,
        ),
    ]
});

/// What a spec resolved to.
#[derive(Debug)]
pub enum Resolution {
    /// A plugin the caller owns and loads in spec order.
    Plugin(Plugin),
    /// The spec named a shared dependency held by the factory; collect it
    /// with [`PluginFactory::into_dependency`].
    Dependency,
}

/// Resolves spec strings against one plugin root.
#[derive(Debug)]
pub struct PluginFactory {
    root: PathBuf,
    options: GitOptions,
    oh_my_zsh: Option<OhMyZsh>,
    oh_my_zsh_name: Option<String>,
}

impl PluginFactory {
    /// Create a factory installing into `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, options: GitOptions) -> Self {
        Self {
            root: root.into(),
            options,
            oh_my_zsh: None,
            oh_my_zsh_name: None,
        }
    }

    /// The plugin installation root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve one spec string.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownPluginType`] when no loader matches and
    /// [`PluginError::InvalidSpec`] when the matched parameters are unusable.
    pub fn make_plugin(&mut self, spec: &str) -> PluginResult<Resolution> {
        let Some((loader, params)) = LOADERS
            .iter()
            .find_map(|loader| loader.params(spec).map(|params| (loader, params)))
        else {
            return Err(PluginError::UnknownPluginType(spec.to_string()));
        };

        debug!(spec, "Resolving plugin");
        (loader.build)(self, spec, &params).map_err(|e| match e {
            PluginError::InvalidSpec { reason, .. } => PluginError::InvalidSpec {
                spec: spec.to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Hand over the Oh-My-Zsh instance, if any spec required it, with the
    /// name of its entry: the explicit spec when one was listed, otherwise
    /// `oh-my-zsh`.
    #[must_use]
    pub fn into_dependency(self) -> Option<(String, OhMyZsh)> {
        let omz = self.oh_my_zsh?;
        let name = self.oh_my_zsh_name.unwrap_or_else(|| OH_MY_ZSH.to_string());
        Some((name, omz))
    }

    fn oh_my_zsh(&mut self) -> &mut OhMyZsh {
        let (root, options) = (&self.root, self.options);
        self.oh_my_zsh
            .get_or_insert_with(|| OhMyZsh::new(root, RequiredRevision::default(), options))
    }

    fn make_github(&mut self, _spec: &str, params: &Params) -> PluginResult<Resolution> {
        let remote = GitRemote::github(param(params, "username")?, param(params, "repo")?)?;
        let revision = RequiredRevision::new(param(params, "version")?)?;
        Ok(self.git_plugin(remote, revision))
    }

    fn make_git(&mut self, _spec: &str, params: &Params) -> PluginResult<Resolution> {
        let (remote, revision) = GitRemote::parse_url(param(params, "source")?)?;
        let revision = RequiredRevision::new(revision.as_deref().unwrap_or_default())?;
        Ok(self.git_plugin(remote, revision))
    }

    fn git_plugin(&self, remote: GitRemote, revision: RequiredRevision) -> Resolution {
        let path = self.root.join(remote.relative_path());
        Resolution::Plugin(Plugin::Git(GitPlugin::new(
            path,
            remote,
            revision,
            self.options,
        )))
    }

    fn make_dir(&mut self, _spec: &str, params: &Params) -> PluginResult<Resolution> {
        let path = self.local_path(param(params, "directory")?);
        Ok(Resolution::Plugin(Plugin::Dir(DirPlugin::new(path))))
    }

    fn make_file(&mut self, _spec: &str, params: &Params) -> PluginResult<Resolution> {
        let path = self.local_path(param(params, "filename")?);
        Ok(Resolution::Plugin(Plugin::File(FilePlugin::new(path))))
    }

    /// Local specs are always relative to the root, even with a leading `/`.
    fn local_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative.trim_start_matches('/'))
    }

    fn make_oh_my_zsh(&mut self, spec: &str, params: &Params) -> PluginResult<Resolution> {
        let version = param(params, "version")?;
        let revision = (!version.is_empty())
            .then(|| RequiredRevision::new(version))
            .transpose()?;

        let omz = self.oh_my_zsh();
        if let Some(revision) = revision {
            omz.set_revision(revision);
        }
        self.oh_my_zsh_name = Some(spec.to_string());
        Ok(Resolution::Dependency)
    }

    fn make_oh_my_zsh_plugin(&mut self, _spec: &str, params: &Params) -> PluginResult<Resolution> {
        let name = param(params, "name")?;
        let dir = self.oh_my_zsh().load_plugin(name);
        Ok(Resolution::Plugin(Plugin::Dir(dir)))
    }

    fn make_oh_my_zsh_theme(&mut self, _spec: &str, params: &Params) -> PluginResult<Resolution> {
        let name = param(params, "name")?;
        let dir = self.oh_my_zsh().load_theme(name);
        Ok(Resolution::Plugin(Plugin::Dir(dir)))
    }
}

fn param<'a>(params: &'a Params, key: &str) -> PluginResult<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| PluginError::InvalidSpec {
            spec: String::new(),
            reason: format!("missing parameter '{key}'"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::RevisionKind;

    fn factory() -> PluginFactory {
        PluginFactory::new("/zpm/Plugins", GitOptions::default())
    }

    fn plugin(factory: &mut PluginFactory, spec: &str) -> Plugin {
        match factory.make_plugin(spec).unwrap() {
            Resolution::Plugin(p) => p,
            Resolution::Dependency => panic!("{spec} resolved to a dependency"),
        }
    }

    #[test]
    fn github_spec() {
        let mut f = factory();
        let Plugin::Git(p) = plugin(&mut f, "github:zsh-users/zsh-autosuggestions@v0.7.0") else {
            panic!("expected a git plugin");
        };
        assert_eq!(
            p.path(),
            Path::new("/zpm/Plugins/github.com/zsh-users/zsh-autosuggestions")
        );
        assert_eq!(p.revision().name(), "v0.7.0");
        assert!(p.remote().is_github());

        let Plugin::Git(p) = plugin(&mut f, "github:zsh-users/zsh-completions") else {
            panic!("expected a git plugin");
        };
        assert_eq!(p.revision(), &RequiredRevision::default());
        assert_eq!(p.revision().kind(), RevisionKind::DefaultBranch);
        assert!(f.into_dependency().is_none());
    }

    #[test]
    fn git_spec() {
        let mut f = factory();
        let Plugin::Git(p) = plugin(&mut f, "git:https://gitlab.com/org/zsh-thing.git@0a1b2c3d")
        else {
            panic!("expected a git plugin");
        };
        assert_eq!(p.path(), Path::new("/zpm/Plugins/gitlab.com/org/zsh-thing"));
        assert_eq!(p.revision().kind(), RevisionKind::Commit);
        assert_eq!(Plugin::Git(p).kind(), "git");

        let err = f.make_plugin("git:file:///etc").unwrap_err();
        assert!(matches!(err, PluginError::InvalidSpec { ref spec, .. } if spec == "git:file:///etc"));
    }

    #[test]
    fn local_specs() {
        let mut f = factory();
        let Plugin::Dir(d) = plugin(&mut f, "dir:my/plugin") else {
            panic!("expected a dir plugin");
        };
        assert_eq!(d.path(), Path::new("/zpm/Plugins/my/plugin"));

        let Plugin::File(p) = plugin(&mut f, "file:/aliases.zsh") else {
            panic!("expected a file plugin");
        };
        assert_eq!(p.path(), Path::new("/zpm/Plugins/aliases.zsh"));
    }

    #[test]
    fn unknown_specs() {
        let mut f = factory();
        for spec in ["", "dir:", "github:Upper/repo", "svn:foo", "oh-my-zsh:plugin:"] {
            assert!(
                matches!(f.make_plugin(spec), Err(PluginError::UnknownPluginType(ref s)) if s == spec),
                "{spec}"
            );
        }
        assert!(matches!(
            f.make_plugin("github:org/repo@-bad"),
            Err(PluginError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn oh_my_zsh_is_shared() {
        let mut f = factory();
        let Plugin::Dir(git) = plugin(&mut f, "oh-my-zsh:plugin:git") else {
            panic!("expected a dir plugin");
        };
        let Plugin::Dir(theme) = plugin(&mut f, "oh-my-zsh:theme:agnoster") else {
            panic!("expected a dir plugin");
        };

        let (name, omz) = f.into_dependency().unwrap();
        assert_eq!(name, OH_MY_ZSH);
        assert_eq!(git.path(), omz.path().join("plugins").join("git"));
        assert_eq!(theme.path(), omz.path().join("themes").join("agnoster"));
        assert_eq!(omz.git().revision().kind(), RevisionKind::DefaultBranch);
    }

    #[test]
    fn explicit_oh_my_zsh_overrides_revision() {
        let mut f = factory();
        plugin(&mut f, "oh-my-zsh:plugin:git");
        assert!(matches!(
            f.make_plugin("oh-my-zsh@stable").unwrap(),
            Resolution::Dependency
        ));
        plugin(&mut f, "oh-my-zsh:theme:agnoster");

        let (name, omz) = f.into_dependency().unwrap();
        assert_eq!(name, "oh-my-zsh@stable");
        assert_eq!(omz.git().revision().name(), "stable");
    }
}
