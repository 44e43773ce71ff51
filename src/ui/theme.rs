//! Visual theme and styling.

use console::Style;

/// Terminal styles used for status output.
#[derive(Debug, Clone)]
pub struct LocaldepsTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for headers (cyan bold).
    pub header: Style,
    /// Style for contextual hints (cyan dim).
    pub hint: Style,
    /// Style for requirement names in listings (bold).
    pub key: Style,
}

impl Default for LocaldepsTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl LocaldepsTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().cyan(),
            hint: Style::new().cyan().dim(),
            key: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            hint: Style::new(),
            key: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(format!("◆ {}", title)))
    }

    /// Format a hint line.
    pub fn format_hint(&self, hint: &str) -> String {
        format!("{}", self.hint.apply_to(hint))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_status_icons() {
        let theme = LocaldepsTheme::plain();
        assert_eq!(theme.format_success("Installed"), "✓ Installed");
        assert_eq!(theme.format_warning("Caution"), "⚠ Caution");
        assert_eq!(theme.format_error("Failed"), "✗ Failed");
    }

    #[test]
    fn theme_formats_header() {
        let theme = LocaldepsTheme::plain();
        assert_eq!(theme.format_header("my-plugin"), "◆ my-plugin");
    }

    #[test]
    fn plain_hint_is_unstyled() {
        let theme = LocaldepsTheme::plain();
        assert_eq!(theme.format_hint("Run localdeps install"), "Run localdeps install");
    }
}
