//! Plugin resolution and update orchestration for zpm, a zsh plugin manager.
//!
//! - [`PluginFactory`]: turns spec strings (`github:user/repo@rev`, `dir:name`,
//!   `file:name`, `git:url@rev`, `oh-my-zsh`, `oh-my-zsh:plugin:name`,
//!   `oh-my-zsh:theme:name`) into [`Plugin`]s
//! - [`Load`] / [`Upgrade`]: the capabilities every plugin, or every plugin
//!   tracking a remote, provides
//! - [`GitPlugin`]: a local clone kept at a required revision
//! - [`PluginStorage`]: the plugins of one invocation in load order, with
//!   concurrent check/install/update passes
//!
//! # Load order
//!
//! Oh-My-Zsh, when any spec requires it, is loaded before everything else.
//! All other plugins load in the order they were listed.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod dir;
pub mod error;
pub mod factory;
pub mod file;
pub mod git;
pub mod ohmyzsh;
pub mod plugin;
pub mod storage;

pub use dir::DirPlugin;
pub use error::{PluginError, PluginResult};
pub use factory::{PluginFactory, Resolution};
pub use file::FilePlugin;
pub use git::{CommitHash, GitOptions, GitPlugin, GitRemote, RequiredRevision, RevisionKind};
pub use ohmyzsh::{OH_MY_ZSH, OhMyZsh};
pub use plugin::{Installation, Load, LoadScript, Plugin, UpdateCheck, Upgrade};
pub use storage::{PLUGINS_DIR, PluginEntry, PluginState, PluginStorage};
