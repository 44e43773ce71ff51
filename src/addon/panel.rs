//! Panel rendering.
//!
//! Two views: the preferences panel, which lists what the plugin needs and
//! offers the install, and the tool panel, which either exposes the gated
//! commands or points the user at the preferences.

use super::Addon;
use crate::requirements::{PackageInstaller, Resolver};
use crate::ui::UserInterface;

/// Neutral message shown whenever dependencies are missing.
pub const NOT_INSTALLED: &str = "Dependencies are not installed";

/// Render the preferences panel.
///
/// The requirement list comes from the manifest cache; the install state
/// from the checker's cache.
pub fn render_preferences<R: Resolver, I: PackageInstaller>(
    addon: &mut Addon<R, I>,
    ui: &mut dyn UserInterface,
) {
    ui.show_header(addon.name());

    let checker = addon.checker_mut();
    match checker.requirement_names(false) {
        Ok(names) if names.is_empty() => {
            ui.message("This plugin does not require any Python packages.");
            return;
        }
        Ok(names) => {
            ui.message("This plugin requires the following Python packages:");
            for name in names {
                ui.message(&format!("- {}", name));
            }
        }
        Err(e) => {
            tracing::warn!("Could not list requirements: {}", e);
            ui.error(&format!("Could not read requirements: {}", e));
            return;
        }
    }

    if checker.is_satisfied(false) {
        ui.success("All dependencies are installed");
    } else {
        ui.warning(NOT_INSTALLED);
        ui.show_hint("Run `localdeps install` to install them.");
    }
}

/// Render the tool panel.
pub fn render_tool_panel<R: Resolver, I: PackageInstaller>(
    addon: &mut Addon<R, I>,
    ui: &mut dyn UserInterface,
) {
    if addon.checker_mut().is_satisfied(false) {
        for id in &addon.commands().gated {
            ui.message(&format!("[{}]", id));
        }
    } else {
        ui.message("You need to install some packages before using this tool.");
        ui.show_hint("Open the preferences panel to install them.");
    }
}
