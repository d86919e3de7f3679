use console::style;

/// Styled terminal output helpers shared by all commands.
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Aligned key/value line for summary blocks.
    pub fn key_value(&self, key: &str, value: &str) {
        println!("  {:<18} {}", style(format!("{key}:")).dim(), value);
    }

    /// Delivered-vs-requested count, colored by completeness.
    pub fn count(&self, label: &str, delivered: usize, requested: u32) {
        let figure = format!("{delivered}/{requested}");
        let styled = if delivered as u32 >= requested {
            style(figure).green()
        } else {
            style(figure).yellow()
        };
        println!("  {:<18} {}", style(format!("{label}:")).dim(), styled);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
