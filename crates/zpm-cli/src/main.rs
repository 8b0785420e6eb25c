//! zpm - a simple zsh plugin manager
//!
//! `zpm load` prints the script a shell sources at startup. The remaining
//! commands install, update and inspect the plugins listed in `~/.zpm.toml`.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

mod commands;
mod config_bridge;
mod render;
mod state;
mod theme;

use commands::{check, install, list, load, update, version};

/// zpm - a simple zsh plugin manager
#[derive(Parser)]
#[command(name = "zpm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file location (default: ~/.zpm.toml)
    #[arg(long, global = true, env = "ZPM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load configured plugins into the current shell
    Load {
        /// Do not use and set cache when loading plugins
        #[arg(long)]
        no_cache: bool,
    },

    /// Check for updates
    Check,

    /// Install new plugins
    Install,

    /// Install updates and download missing plugins
    Update {
        /// Update only the specified plugin
        #[arg(long)]
        plugin: Option<String>,

        /// Only install missing plugins without updating the installed ones
        #[arg(long)]
        only_missing: bool,
    },

    /// List plugins in load order
    List,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Version) {
        version::show_version();
        return Ok(());
    }

    let resolved = zpm_config::Config::load(cli.config.as_deref())
        .context("failed to read the config")?;
    let config = resolved.config;

    // Set up logging from config, with --verbose override.
    let mut log_config = config_bridge::to_log_config(&config);
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = zpm_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    if resolved.created {
        info!(path = %resolved.path.display(), "Created default config");
    }

    let root = config.root_dir();
    std::fs::create_dir_all(&root)
        .with_context(|| format!("failed to create {}", root.display()))?;

    match cli.command {
        Commands::Load { no_cache } => {
            load::run_load(&config, cli.config.as_deref(), no_cache).await?;
        },
        Commands::Check => check::run_check(&config).await?,
        Commands::Install => install::run_install(&config).await?,
        Commands::Update {
            plugin,
            only_missing,
        } => update::run_update(&config, plugin.as_deref(), only_missing).await?,
        Commands::List => list::list_plugins(&config)?,
        Commands::Version => version::show_version(),
    }

    Ok(())
}
