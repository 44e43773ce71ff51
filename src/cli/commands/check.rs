//! Check command implementation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use crate::addon::NOT_INSTALLED;
use crate::cli::args::CheckArgs;
use crate::error::{LocaldepsError, Result};
use crate::requirements::{GapResult, InstallState};
use crate::ui::UserInterface;

use super::context::ProjectContext;
use super::dispatcher::{Command, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    context: ProjectContext,
    args: CheckArgs,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    plugin: String,
    satisfied: bool,
    state: InstallState,
    deps_dir: &'a Path,
    checked_at: Option<DateTime<Utc>>,
    requirements: &'a [GapResult],
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(context: &ProjectContext, args: CheckArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &CheckArgs {
        &self.args
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut addon = self.context.addon();
        let checker = addon.checker_mut();

        let gaps = match checker.check_report(self.args.force) {
            Ok(gaps) => gaps,
            Err(e) => {
                ui.error(&format!("Could not read requirements: {}", e));
                return Ok(CommandResult::failure(2));
            }
        };
        let satisfied = checker.state() == InstallState::Satisfied;

        if self.args.json {
            let record = checker.record();
            let report = CheckReport {
                plugin: self.context.name(),
                satisfied,
                state: record.state,
                deps_dir: &checker.layout().deps_dir,
                checked_at: record.checked_at,
                requirements: &gaps,
            };
            let output =
                serde_json::to_string_pretty(&report).map_err(|e| LocaldepsError::Other(e.into()))?;
            println!("{}", output);
        } else {
            ui.show_header(&self.context.name());
            for gap in &gaps {
                let line = format!("{}: {}", gap.requirement, gap.status.label());
                if gap.status.is_satisfied() {
                    ui.success(&line);
                } else {
                    ui.warning(&line);
                }
            }

            if satisfied {
                ui.success("All dependencies are installed");
            } else {
                ui.warning(NOT_INSTALLED);
                ui.show_hint("Run `localdeps install` to install them.");
            }
        }

        Ok(if satisfied {
            CommandResult::success()
        } else {
            CommandResult::failure(1)
        })
    }
}
