//! List command implementation.

use crate::cli::args::ListArgs;
use crate::error::{LocaldepsError, Result};
use crate::ui::{OutputMode, UserInterface};

use super::context::ProjectContext;
use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    context: ProjectContext,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(context: &ProjectContext, args: ListArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut addon = self.context.addon();
        let checker = addon.checker_mut();

        let requirements = match checker.requirements(self.args.force) {
            Ok(requirements) => requirements,
            Err(e) => {
                ui.error(&format!("Could not read requirements: {}", e));
                return Ok(CommandResult::failure(2));
            }
        };

        if self.args.json {
            let output = serde_json::to_string_pretty(&requirements)
                .map_err(|e| LocaldepsError::Other(e.into()))?;
            println!("{}", output);
            return Ok(CommandResult::success());
        }

        if requirements.is_empty() {
            ui.message("No requirements in manifest.");
            return Ok(CommandResult::success());
        }

        let verbose = ui.output_mode() == OutputMode::Verbose;
        for spec in &requirements {
            if verbose {
                ui.message(&spec.to_string());
            } else {
                ui.message(&spec.name);
            }
        }

        Ok(CommandResult::success())
    }
}
