//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{LocaldepsError, Result};

use super::{parse_answer, OutputMode, Prompt, SpinnerHandle, UserInterface};

/// Prefix of environment variables that answer prompts by key.
const PROMPT_ENV_PREFIX: &str = "LOCALDEPS_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `LOCALDEPS_PROMPT_<KEY>` variables or the
/// prompt's default; spinners become plain status lines.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn confirm(&mut self, prompt: &Prompt) -> Result<bool> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        if let Some(value) = self.env_overrides.get(&env_key) {
            return parse_answer(value).ok_or_else(|| LocaldepsError::ConfigValidationError {
                message: format!("{} must be yes or no, got '{}'", env_key, value),
            });
        }

        prompt
            .default
            .ok_or_else(|| LocaldepsError::ConfigValidationError {
                message: format!(
                    "Cannot prompt for '{}' in non-interactive mode (no default value)",
                    prompt.key
                ),
            })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            println!("{}", message);
        }
        Box::new(LineSpinner { mode: self.mode })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            println!("  {}", hint);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that prints only its final status line.
struct LineSpinner {
    mode: OutputMode,
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }
}
