//! Install command implementation.

use crate::addon::{InstallAction, InstallOutcome, RecordingHost, NOT_INSTALLED};
use crate::cli::args::InstallArgs;
use crate::error::Result;
use crate::ui::{Prompt, UserInterface};

use super::context::ProjectContext;
use super::dispatcher::{Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand {
    context: ProjectContext,
    args: InstallArgs,
}

impl InstallCommand {
    /// Create a new install command.
    pub fn new(context: &ProjectContext, args: InstallArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &InstallArgs {
        &self.args
    }
}

impl Command for InstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut addon = self.context.addon();
        let mut host = RecordingHost::new();
        addon.register(&mut host);

        if addon.gated_registered() {
            ui.success("All dependencies are already installed");
            return Ok(CommandResult::success());
        }

        let names = match addon.checker_mut().requirement_names(false) {
            Ok(names) => names,
            Err(e) => {
                ui.error(&format!("Could not read requirements: {}", e));
                return Ok(CommandResult::failure(2));
            }
        };
        let deps_dir = addon.checker().layout().deps_dir.clone();

        if !self.args.yes {
            ui.message(&format!(
                "{} will install into {}:",
                addon.name(),
                deps_dir.display()
            ));
            for name in &names {
                ui.message(&format!("- {}", name));
            }
            let prompt = Prompt::confirm("install", "Install these packages?", Some(true));
            if !ui.confirm(&prompt)? {
                ui.warning("Install cancelled");
                return Ok(CommandResult::failure(1));
            }
        }

        let mut spinner = ui.start_spinner(&format!("Installing {} package(s)...", names.len()));
        addon
            .checker_mut()
            .installer_mut()
            .set_output_listener(spinner.output_listener());

        match InstallAction::new().execute(&mut addon, &mut host) {
            InstallOutcome::Installed => {
                spinner.finish_success(&format!(
                    "Dependencies installed into {}",
                    deps_dir.display()
                ));
                if ui.output_mode().shows_details() {
                    for id in &addon.commands().gated {
                        ui.message(&format!("Enabled: {}", id));
                    }
                }
                Ok(CommandResult::success())
            }
            InstallOutcome::Failed | InstallOutcome::Busy => {
                spinner.finish_error(NOT_INSTALLED);
                ui.show_hint("Re-run with --debug to see installer output.");
                Ok(CommandResult::failure(1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::testing::write_dist_info;
    use crate::requirements::DEFAULT_DEPS_DIR;
    use crate::ui::{MockUI, SpinnerStatus};
    use std::fs;
    use tempfile::TempDir;

    fn context_with(temp: &TempDir, manifest: &str) -> ProjectContext {
        fs::write(temp.path().join("requirements.txt"), manifest).unwrap();
        ProjectContext::load(temp.path(), None).unwrap()
    }

    #[test]
    fn already_installed_skips_prompt() {
        let temp = TempDir::new().unwrap();
        let context = context_with(&temp, "six\n");
        write_dist_info(&temp.path().join(DEFAULT_DEPS_DIR), "six", "1.16.0");
        let mut ui = MockUI::new();

        let result = InstallCommand::new(&context, InstallArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.prompts_shown().is_empty());
        assert!(ui.spinners().is_empty());
        assert!(ui.has_success("already installed"));
    }

    #[test]
    fn declining_prompt_cancels() {
        let temp = TempDir::new().unwrap();
        let context = context_with(&temp, "six\nrequests\n");
        let mut ui = MockUI::new();
        ui.set_prompt_response("install", false);

        let result = InstallCommand::new(&context, InstallArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert_eq!(ui.prompts_shown(), ["install"]);
        assert!(ui.has_message("- requests"));
        assert!(ui.has_warning("cancelled"));
        assert!(ui.spinners().is_empty());
    }

    #[test]
    fn bad_manifest_exits_2() {
        let temp = TempDir::new().unwrap();
        let context = context_with(&temp, "=>2\n");
        let mut ui = MockUI::new();

        let result = InstallCommand::new(&context, InstallArgs { yes: true })
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.spinners().is_empty());
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};

        fn fake_python(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-python");
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn context_with_python(temp: &TempDir, manifest: &str, body: &str) -> ProjectContext {
            let python = fake_python(temp.path(), body);
            fs::create_dir_all(temp.path().join(".localdeps")).unwrap();
            fs::write(
                temp.path().join(".localdeps/config.yml"),
                format!("python: {}\n", python.display()),
            )
            .unwrap();
            context_with(temp, manifest)
        }

        #[test]
        fn installer_exit_zero_without_packages_fails() {
            let temp = TempDir::new().unwrap();
            let context = context_with_python(&temp, "six\n", "exit 0");
            let mut ui = MockUI::new();

            let result = InstallCommand::new(&context, InstallArgs { yes: true })
                .execute(&mut ui)
                .unwrap();

            assert_eq!(result.exit_code, 1);
            assert_eq!(
                ui.spinner_outcomes(),
                [(SpinnerStatus::Error, NOT_INSTALLED.to_string())]
            );
            assert!(ui.prompts_shown().is_empty());
        }

        #[test]
        fn installer_that_lands_packages_succeeds() {
            let temp = TempDir::new().unwrap();
            let script = r#"
case "$2" in
  ensurepip) exit 0 ;;
esac
while [ $# -gt 0 ]; do
  if [ "$1" = "--target" ]; then target="$2"; fi
  shift
done
mkdir -p "$target/six-1.16.0.dist-info"
printf 'Metadata-Version: 2.1\nName: six\nVersion: 1.16.0\n' > "$target/six-1.16.0.dist-info/METADATA"
"#;
            let context = context_with_python(&temp, "six\n", script);
            let mut ui = MockUI::new();

            let result = InstallCommand::new(&context, InstallArgs::default())
                .execute(&mut ui)
                .unwrap();

            assert!(result.success);
            assert_eq!(ui.prompts_shown(), ["install"]);
            let outcomes = ui.spinner_outcomes();
            assert_eq!(outcomes[0].0, SpinnerStatus::Success);
            assert!(temp
                .path()
                .join(DEFAULT_DEPS_DIR)
                .join("six-1.16.0.dist-info")
                .is_dir());
        }
    }
}
