//! Exercise command implementation.

use crate::addon::exercise;
use crate::cli::args::ExerciseArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::context::ProjectContext;
use super::dispatcher::{Command, CommandResult};

/// The exercise command implementation.
pub struct ExerciseCommand {
    context: ProjectContext,
    args: ExerciseArgs,
}

impl ExerciseCommand {
    /// Create a new exercise command.
    pub fn new(context: &ProjectContext, args: ExerciseArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ExerciseArgs {
        &self.args
    }
}

impl Command for ExerciseCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let addon = self.context.addon();
        let checker = addon.checker();

        if !checker.layout().deps_dir.is_dir() {
            ui.warning(&format!(
                "{} does not exist; the import can only use packages installed elsewhere",
                checker.layout().deps_dir.display()
            ));
        }

        let report = exercise(
            &self.context.config().python,
            checker.search_path(),
            &self.args.module,
        )?;

        if report.imported {
            let location = report.location.as_deref().unwrap_or("<unknown>");
            ui.success(&format!("import {} -> {}", report.module, location));
            Ok(CommandResult::success())
        } else {
            ui.error(&format!("import {} failed", report.module));
            if let Some(diagnostics) = &report.diagnostics {
                for line in diagnostics.lines() {
                    ui.message(line);
                }
            }
            Ok(CommandResult::failure(1))
        }
    }
}
