//! Display primitives shared by CLI output.

pub mod format;

use console::style;

pub use format::*;

/// Render a success line.
pub fn action_success(message: &str) -> String {
    format!("{} {}", style("\u{2713}").green().bold(), message)
}

/// Render a failure line.
pub fn action_failure(message: &str) -> String {
    format!("{} {}", style("\u{2717}").red().bold(), message)
}

/// Render an informational line for something that did not happen.
pub fn action_skipped(message: &str) -> String {
    format!("{} {}", style("-").dim(), style(message).dim())
}
