//! Per-run state shared between the engine and its driver.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::services::precision::Decimal;

/// Cooperative cancellation flag for one calculation.
///
/// The driver holds a clone and calls [`RunSignal::stop`]; the engine only
/// ever reads it. The flag only moves from active to stopped, so a single
/// atomic word is enough.
#[derive(Debug, Clone)]
pub struct RunSignal {
    active: Arc<AtomicBool>,
}

impl RunSignal {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Request cancellation. Idempotent.
    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Default for RunSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot emitted while the series is being summed.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Global series sub-step counter, strictly increasing within a run
    pub iteration: u64,
    /// Working precision the partial sum is being computed at
    pub working_precision: u64,
    /// Requested digit count
    pub target_precision: u64,
    /// Accumulator of the series so far
    pub partial: Decimal,
}

impl ProgressUpdate {
    /// Fraction of the target precision reached, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.target_precision == 0 {
            return 0.0;
        }
        (self.working_precision as f64 / self.target_precision as f64).min(1.0)
    }
}

/// States of the precision escalation scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Running,
    Stabilizing,
    Escalating,
    Finalized,
    Cancelled,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Stabilizing => "stabilizing",
            Self::Escalating => "escalating",
            Self::Finalized => "finalized",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Counters describing how a run reached its result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Refinement passes (one full series sum each)
    pub outer_iterations: u64,
    /// Series sub-steps across all passes
    pub inner_iterations: u64,
    /// Times the working precision was doubled
    pub escalations: u64,
    /// Times the guard digits were widened to settle the final truncation
    pub guard_extensions: u64,
    /// Guard digits in effect when the run finished
    pub final_guard_digits: u64,
    /// Stabilizations detected by exact reappearance in the window
    pub window_hits: u64,
    /// Stabilizations detected by the change fitting in the guard digits
    pub settle_hits: u64,
}

/// A finalized approximation of pi.
#[derive(Debug, Clone)]
pub struct PiApproximation {
    /// Value truncated to exactly `digits` significant digits
    pub value: Decimal,
    /// Requested digit count
    pub digits: u64,
    pub stats: RunStats,
}

impl PiApproximation {
    /// Full decimal digit string, e.g. `3.141592653` for ten digits.
    pub fn digit_string(&self) -> String {
        self.value.to_string()
    }
}

/// Terminal result of one calculation.
#[derive(Debug, Clone)]
pub enum Outcome {
    Finalized(PiApproximation),
    /// Stopped on request; no value is produced.
    Cancelled {
        working_precision: u64,
        inner_iterations: u64,
    },
}

impl Outcome {
    pub fn approximation(&self) -> Option<&PiApproximation> {
        match self {
            Self::Finalized(approximation) => Some(approximation),
            Self::Cancelled { .. } => None,
        }
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_signal_stop_is_shared() {
        let signal = RunSignal::new();
        let observer = signal.clone();
        assert!(observer.is_active());
        signal.stop();
        assert!(!observer.is_active());
        signal.stop();
        assert!(!observer.is_active());
    }

    #[test]
    fn test_progress_fraction() {
        let update = ProgressUpdate {
            iteration: 10,
            working_precision: 250,
            target_precision: 1000,
            partial: Decimal::zero(),
        };
        assert!((update.fraction() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(EngineState::Finalized.to_string(), "finalized");
        assert_eq!(EngineState::Stabilizing.to_string(), "stabilizing");
    }
}
