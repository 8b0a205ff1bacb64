//! Styling for diagnostics written to stderr.

use console::Style;

/// Create an error-styled string (red with cross).
pub fn error(msg: &str) -> String {
    let style = Style::new().red().for_stderr();
    format!("{} Error: {}", style.apply_to("✗"), msg)
}

/// Create a warning-styled string (yellow).
pub fn warn(msg: &str) -> String {
    let style = Style::new().yellow().for_stderr();
    format!("{} {}", style.apply_to("⚠"), msg)
}
