//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. It can be configured with
//! pre-determined prompt answers.
//!
//! # Example
//!
//! ```
//! use localdeps::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("install", true);
//!
//! ui.message("Checking dependencies");
//! assert!(ui.confirm(&Prompt::confirm("install", "Install?", None)).unwrap());
//!
//! assert!(ui.has_message("Checking"));
//! assert_eq!(ui.prompts_shown(), ["install"]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;

use super::{OutputMode, Prompt, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    hints: Vec<String>,
    spinners: Vec<String>,
    spinner_outcomes: Rc<RefCell<Vec<(SpinnerStatus, String)>>>,
    prompt_responses: HashMap<String, bool>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self {
            mode: OutputMode::Normal,
            ..Default::default()
        }
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set the answer for a prompt key.
    pub fn set_prompt_response(&mut self, key: &str, response: bool) {
        self.prompt_responses.insert(key.to_string(), response);
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Messages of all spinners that were started.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// How each spinner finished, in order.
    pub fn spinner_outcomes(&self) -> Vec<(SpinnerStatus, String)> {
        self.spinner_outcomes.borrow().clone()
    }

    /// Keys of all prompts that were shown.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    pub fn has_hint(&self, msg: &str) -> bool {
        self.hints.iter().any(|m| m.contains(msg))
    }

    /// Everything written, one entry per line, in a stable order.
    ///
    /// Handy for snapshotting whole screens.
    pub fn transcript(&self) -> String {
        let mut out = Vec::new();
        out.extend(self.headers.iter().map(|h| format!("# {}", h)));
        out.extend(self.messages.iter().cloned());
        out.extend(self.successes.iter().map(|s| format!("✓ {}", s)));
        out.extend(self.warnings.iter().map(|w| format!("⚠ {}", w)));
        out.extend(self.errors.iter().map(|e| format!("✗ {}", e)));
        out.extend(self.hints.iter().map(|h| format!("hint: {}", h)));
        out.join("\n")
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn confirm(&mut self, prompt: &Prompt) -> Result<bool> {
        self.prompts_shown.push(prompt.key.clone());
        Ok(self
            .prompt_responses
            .get(&prompt.key)
            .copied()
            .or(prompt.default)
            .unwrap_or(false))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner {
            outcomes: Rc::clone(&self.spinner_outcomes),
            messages: Vec::new(),
        })
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_hint(&mut self, hint: &str) {
        self.hints.push(hint.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Status of a mock spinner when finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStatus {
    Success,
    Error,
}

/// Mock spinner that reports its outcome back to the [`MockUI`].
#[derive(Debug)]
pub struct MockSpinner {
    outcomes: Rc<RefCell<Vec<(SpinnerStatus, String)>>>,
    messages: Vec<String>,
}

impl MockSpinner {
    /// Messages set while spinning.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.outcomes
            .borrow_mut()
            .push((SpinnerStatus::Success, msg.to_string()));
    }

    fn finish_error(&mut self, msg: &str) {
        self.outcomes
            .borrow_mut()
            .push((SpinnerStatus::Error, msg.to_string()));
    }
}
