//! Time and truncation formatters for CLI output.

use std::time::Duration;

/// Format a duration as `H:MM:SS.mmm`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Estimate time left from the time spent so far and the fraction done.
///
/// Returns `None` until there is any progress to extrapolate from.
pub fn estimate_remaining(elapsed: Duration, fraction: f64) -> Option<Duration> {
    if !(fraction > 0.0 && fraction.is_finite()) {
        return None;
    }
    let fraction = fraction.min(1.0);
    let spent = elapsed.as_secs_f64();
    Duration::try_from_secs_f64(spent / fraction - spent).ok()
}

/// Truncate a string with unicode ellipsis.
pub fn truncate_ellipsis(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}\u{2026}", &s[..max_len.saturating_sub(1)])
    }
}
