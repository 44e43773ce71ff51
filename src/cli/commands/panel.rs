//! Panel command implementation.

use crate::addon::{render_preferences, render_tool_panel};
use crate::cli::args::PanelArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::context::ProjectContext;
use super::dispatcher::{Command, CommandResult};

/// The panel command implementation.
pub struct PanelCommand {
    context: ProjectContext,
    args: PanelArgs,
}

impl PanelCommand {
    /// Create a new panel command.
    pub fn new(context: &ProjectContext, args: PanelArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &PanelArgs {
        &self.args
    }
}

impl Command for PanelCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut addon = self.context.addon();
        if self.args.tool {
            render_tool_panel(&mut addon, ui);
        } else {
            render_preferences(&mut addon, ui);
        }
        Ok(CommandResult::success())
    }
}
