//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::requirements::OutputListener;

use super::theme::LocaldepsTheme;
use super::SpinnerHandle;

/// Longest output line shown under a spinner.
const MAX_LINE_WIDTH: usize = 72;

/// Output lines kept under a spinner.
const LIVE_LINES: usize = 3;

/// A progress spinner for long-running operations.
pub struct ProgressSpinner {
    bar: ProgressBar,
    base_message: String,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .expect("spinner template is valid"),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            base_message: message.to_string(),
        }
    }

    /// Create a spinner that doesn't show (for silent mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            base_message: String::new(),
        }
    }

    fn finish_with(&mut self, line: String) {
        self.bar.set_style(
            ProgressStyle::default_spinner()
                .template("{msg}")
                .expect("finish template is valid"),
        );
        self.bar.finish_with_message(line);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.base_message = msg.to_string();
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = LocaldepsTheme::new().format_success(msg);
        self.finish_with(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = LocaldepsTheme::new().format_error(msg);
        self.finish_with(line);
    }

    fn output_listener(&self) -> Option<OutputListener> {
        Some(live_output_listener(
            self.bar.clone(),
            self.base_message.clone(),
            LIVE_LINES,
        ))
    }
}

/// Create an output listener that shows the last `max_lines` installer
/// lines under the spinner's base message.
pub fn live_output_listener(
    bar: ProgressBar,
    base_message: String,
    max_lines: usize,
) -> OutputListener {
    let buffer: Mutex<VecDeque<String>> = Mutex::new(VecDeque::new());
    let theme = LocaldepsTheme::new();

    Arc::new(move |line: &str| {
        let text = line.trim_end();
        if text.is_empty() {
            return;
        }
        tracing::trace!("installer: {}", text);

        let display: String = if text.chars().count() > MAX_LINE_WIDTH {
            let cut: String = text.chars().take(MAX_LINE_WIDTH - 3).collect();
            format!("{}...", cut)
        } else {
            text.to_string()
        };

        // A poisoned buffer only loses display lines.
        let Ok(mut buf) = buffer.lock() else {
            return;
        };
        buf.push_back(display);
        while buf.len() > max_lines {
            buf.pop_front();
        }

        let mut msg = base_message.clone();
        for line in buf.iter() {
            msg.push_str("\n  ");
            msg.push_str(&theme.dim.apply_to(format!("» {}", line)).to_string());
        }
        bar.set_message(msg);
    })
}
