//! Subcommand implementations.

pub(crate) mod check;
mod helpers;
pub(crate) mod install;
pub(crate) mod list;
pub(crate) mod load;
pub(crate) mod update;
pub(crate) mod version;
