//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// localdeps - Private Python dependencies for host-application plugins.
#[derive(Debug, Parser)]
#[command(name = "localdeps")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .localdeps/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to plugin root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output, including installer output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check whether every requirement resolves from the private directory
    Check(CheckArgs),

    /// Install the manifest into the private directory
    Install(InstallArgs),

    /// List requirement names from the manifest
    List(ListArgs),

    /// Import a module with the private directory on the search path
    Exercise(ExerciseArgs),

    /// Print the preferences panel
    Panel(PanelArgs),
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, Args)]
pub struct CheckArgs {
    /// Ignore cached state and re-read the manifest
    #[arg(short, long)]
    pub force: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, Default, Args)]
pub struct InstallArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Re-read the manifest instead of using the cached copy
    #[arg(short, long)]
    pub force: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `exercise` command.
#[derive(Debug, Clone, Args)]
pub struct ExerciseArgs {
    /// Module to import, e.g. `six` or `requests.adapters`
    pub module: String,
}

/// Arguments for the `panel` command.
#[derive(Debug, Clone, Default, Args)]
pub struct PanelArgs {
    /// Show the tool panel instead of the preferences panel
    #[arg(long)]
    pub tool: bool,
}
