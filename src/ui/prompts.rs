//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

use crate::error::{LocaldepsError, Result};

use super::Prompt;

/// Convert dialoguer errors to LocaldepsError.
fn map_dialoguer_err(e: dialoguer::Error) -> LocaldepsError {
    LocaldepsError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Ask a yes/no question on `term`.
pub fn prompt_confirm(prompt: &Prompt, term: &Term) -> Result<bool> {
    Confirm::with_theme(&prompt_theme())
        .with_prompt(&prompt.question)
        .default(prompt.default.unwrap_or(true))
        .interact_on(term)
        .map_err(map_dialoguer_err)
}
