//! Progress bar utilities using indicatif for terminal output
//!
//! The bar tracks working precision against the target digit count. Its
//! message carries the live preview of the partial sum together with the
//! elapsed and estimated remaining time.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::display::{estimate_remaining, format_elapsed, truncate_ellipsis};
use crate::domain::models::ProgressUpdate;

/// Style template for the precision bar
const PRECISION_TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} digits {percent:>3}% {msg}";

/// Progress bar characters for visual effect
const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Significant digits of the partial sum shown in the preview
const PREVIEW_DIGITS: u64 = 24;

/// Create a precision progress bar of `total` digits.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(PRECISION_TEMPLATE) {
        pb.set_style(style.progress_chars(PROGRESS_CHARS));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with a warning message (yellow !)
    fn finish_warning(&self, message: impl Into<String>);

    /// Update progress and message in one call
    fn update(&self, position: u64, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_warning(&self, message: impl Into<String>) {
        self.finish_with_message(format!("! {}", message.into()));
    }

    fn update(&self, position: u64, message: impl Into<String>) {
        self.set_position(position);
        self.set_message(message.into());
    }
}

/// Live display of a running calculation.
pub struct PrecisionProgress {
    bar: ProgressBar,
    started: Instant,
}

impl PrecisionProgress {
    /// A visible bar for `target` digits.
    pub fn new(target: u64) -> Self {
        Self {
            bar: create_progress_bar(target),
            started: Instant::now(),
        }
    }

    /// A display that draws nothing (JSON mode and tests).
    pub fn hidden(target: u64) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(target);
        Self {
            bar,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Apply one progress update.
    pub fn on_update(&self, update: &ProgressUpdate) {
        ProgressBarExt::update(
            &self.bar,
            update.working_precision,
            progress_message(update, self.elapsed()),
        );
    }

    pub fn finish_success(&self, message: impl Into<String>) {
        self.bar.set_position(self.bar.length().unwrap_or(0));
        self.bar.finish_success(message);
    }

    pub fn finish_cancelled(&self) {
        self.bar.finish_warning("Cancelled");
    }
}

/// Message shown next to the bar: digit preview, elapsed, and remaining time.
pub fn progress_message(update: &ProgressUpdate, elapsed: Duration) -> String {
    let preview = truncate_ellipsis(
        &update.partial.preview(PREVIEW_DIGITS.min(update.working_precision)),
        PREVIEW_DIGITS as usize + 1,
    );
    let remaining = estimate_remaining(elapsed, update.fraction())
        .map_or_else(|| "-".to_string(), format_elapsed);
    format!(
        "{preview} elapsed {} remaining {remaining}",
        format_elapsed(elapsed)
    )
}
