//! Terminal user interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use localdeps::ui::{create_ui, OutputMode};
//!
//! // Use non-interactive mode for testability
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("my-plugin");
//! ui.success("Dependencies installed");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI, SpinnerStatus};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::prompt_confirm;
pub use spinner::{live_output_listener, ProgressSpinner};
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, LocaldepsTheme};

use crate::error::Result;
use crate::requirements::OutputListener;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &Prompt) -> Result<bool>;

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show a contextual hint.
    fn show_hint(&mut self, hint: &str);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// A listener that shows subprocess output under the spinner.
    ///
    /// The listener may be called from another thread.
    fn output_listener(&self) -> Option<OutputListener> {
        None
    }
}

/// A yes/no question to show to the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Unique key for the prompt (used for lookup of preset answers).
    pub key: String,
    /// The question to display.
    pub question: String,
    /// Answer if the user just presses enter, or if nobody can answer.
    pub default: Option<bool>,
}

impl Prompt {
    /// Create a confirmation prompt.
    pub fn confirm(key: &str, question: &str, default: Option<bool>) -> Self {
        Self {
            key: key.to_string(),
            question: question.to_string(),
            default,
        }
    }
}

/// Interpret a preset answer such as `yes` or `0`.
pub(crate) fn parse_answer(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
