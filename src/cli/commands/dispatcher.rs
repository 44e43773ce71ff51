//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use super::context::ProjectContext;
use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, reporting through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given plugin root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            config_override: None,
        }
    }

    /// Read configuration from `path` instead of `.localdeps/config.yml`.
    pub fn with_config_override(mut self, path: Option<PathBuf>) -> Self {
        self.config_override = path;
        self
    }

    /// Get the plugin root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Load configuration, then route the subcommand to its implementation.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let context = ProjectContext::load(&self.project_root, self.config_override.as_deref())?;
        tracing::debug!(
            "Plugin root {} (manifest {}, deps {})",
            context.root().display(),
            context.config().layout.manifest.display(),
            context.config().layout.deps_dir.display()
        );

        match &cli.command {
            Commands::Check(args) => {
                super::check::CheckCommand::new(&context, args.clone()).execute(ui)
            }
            Commands::Install(args) => {
                super::install::InstallCommand::new(&context, args.clone()).execute(ui)
            }
            Commands::List(args) => {
                super::list::ListCommand::new(&context, args.clone()).execute(ui)
            }
            Commands::Exercise(args) => {
                super::exercise::ExerciseCommand::new(&context, args.clone()).execute(ui)
            }
            Commands::Panel(args) => {
                super::panel::PanelCommand::new(&context, args.clone()).execute(ui)
            }
        }
    }
}
