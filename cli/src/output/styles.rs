//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Centralized stylesheet for CLI output colors.
#[derive(Default, Clone)]
pub struct Styles {
    /// Success messages (green)
    pub success: Style,
    /// Warning messages (yellow)
    pub warning: Style,
    /// In-progress step arrows (cyan)
    pub step: Style,
    /// Dimmed/secondary text
    pub dim: Style,
    /// Table headers and section titles
    pub header: Style,
    /// `ACTIVE` instance status
    pub status_active: Style,
    /// `BUILD` instance status
    pub status_build: Style,
    /// `ERROR` instance status
    pub status_error: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.step = Style::new().cyan();
        self.dim = Style::new().dimmed();
        self.header = Style::new().bold().cyan();
        self.status_active = Style::new().green();
        self.status_build = Style::new().yellow();
        self.status_error = Style::new().bold().red();
    }

    /// Style for an instance status string.
    #[must_use]
    pub fn status(&self, status: &str) -> Style {
        match status {
            "ACTIVE" => self.status_active,
            "BUILD" => self.status_build,
            "ERROR" => self.status_error,
            _ => Style::new(),
        }
    }
}
