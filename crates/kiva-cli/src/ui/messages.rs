//! Status message functions for terminal output.

use owo_colors::OwoColorize;

use super::colors_enabled;

fn emit(symbol: &str, styled_symbol: String, message: &str, styled_message: String) {
    if colors_enabled() {
        eprintln!("{} {}", styled_symbol, styled_message);
    } else {
        eprintln!("{} {}", symbol, message);
    }
}

/// Print a success message to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use kiva_cli::ui::success;
///
/// success("Configuration written to webpack.config.json");
/// ```
pub fn success(message: &str) {
    emit("✓", "✓".green().bold().to_string(), message, message.to_string());
}

/// Print an info message to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use kiva_cli::ui::info;
///
/// info("Serving 3 fixture(s) under /mock");
/// ```
pub fn info(message: &str) {
    emit("ℹ", "ℹ".blue().bold().to_string(), message, message.to_string());
}

/// Print a warning message to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use kiva_cli::ui::warning;
///
/// warning("asset 'js/vendors.js' is over budget");
/// ```
pub fn warning(message: &str) {
    emit("⚠", "⚠".yellow().bold().to_string(), message, message.yellow().to_string());
}

/// Print an error message to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use kiva_cli::ui::error;
///
/// error("Failed to read mocks.json");
/// ```
pub fn error(message: &str) {
    emit("✗", "✗".red().bold().to_string(), message, message.red().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        success("Success message");
        info("Info message");
        warning("Warning message");
        error("Error message");
    }
}
