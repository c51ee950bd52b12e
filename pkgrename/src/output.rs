//! Terminal output styling.

use owo_colors::OwoColorize;

/// Whether output is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputStyle {
    pub use_color: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_color: std::env::var_os("NO_COLOR").is_none(),
        }
    }
}

impl OutputStyle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors in output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Format a per-file error
    #[must_use]
    pub fn error(&self, text: &str) -> String {
        if self.use_color {
            text.red().to_string()
        } else {
            text.to_owned()
        }
    }

    /// Format a note about special characters
    #[must_use]
    pub fn warning(&self, text: &str) -> String {
        if self.use_color {
            text.bright_yellow().to_string()
        } else {
            text.to_owned()
        }
    }

    #[must_use]
    pub fn prompt(&self, text: &str) -> String {
        if self.use_color {
            text.bold().to_string()
        } else {
            text.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_style_leaves_text_alone() {
        let style = OutputStyle { use_color: true }.no_color();

        assert_eq!(style.error("x"), "x");
        assert_eq!(style.warning("(1)"), "(1)");
        assert_eq!(style.prompt("?"), "?");
    }

    #[test]
    fn colored_style_adds_escapes() {
        let style = OutputStyle { use_color: true };

        assert_eq!(style.error("x"), "\x1b[31mx\x1b[39m");
        assert!(style.warning("(1)").contains("(1)"));
    }
}
