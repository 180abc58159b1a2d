//! PiEngine - fixed-point iteration under escalating working precision
//!
//! The engine starts at a modest working precision, refines the candidate
//! until it stabilizes, then doubles the precision (capped at the target) and
//! continues from the stabilized value. At the target precision a stabilized
//! candidate is truncated to the requested digit count once the guard digits
//! leave no doubt about the truncated digits.
//!
//! All state lives in a per-call [`PiRun`]; the engine itself holds only
//! configuration and can be reused for any number of calculations.

use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{
    EngineConfig, EngineState, Outcome, PiApproximation, ProgressUpdate, RunSignal, RunStats,
};
use crate::domain::ports::{NullProgress, ProgressSink};
use crate::services::convergence_tracker::ConvergenceWindow;
use crate::services::precision::{Decimal, PrecisionContext, Rounding};
use crate::services::series_refiner::{Refinement, SeriesRefiner};

/// Starting candidate of the iteration.
const INITIAL_CANDIDATE: u64 = 3;

/// Rounding error, in units of the last place, that one series step can add
/// to the sum (two divisions, two multiplications, two additions).
const ULPS_PER_STEP: u64 = 8;

/// Slack for the error carried in from the candidate itself.
const BASE_MARGIN_ULPS: u64 = 10;

/// How a refined candidate was recognised as stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stabilization {
    /// Exact reappearance in the convergence window
    Reappeared,
    /// Change from the previous candidate fits inside the guard digits
    Settled,
}

/// Arbitrary-precision pi engine.
#[derive(Debug, Clone, Default)]
pub struct PiEngine {
    config: EngineConfig,
}

impl PiEngine {
    /// Create an engine, rejecting configurations that cannot converge.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        if config.initial_precision == 0 {
            return Err(EngineError::InvalidConfiguration(
                "initial_precision must be at least 1".to_string(),
            ));
        }
        if config.guard_digits == 0 {
            return Err(EngineError::InvalidConfiguration(
                "guard_digits must be at least 1".to_string(),
            ));
        }
        if config.progress_interval == 0 {
            return Err(EngineError::InvalidConfiguration(
                "progress_interval must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute pi to `target` significant digits.
    ///
    /// Progress is reported to `sink` every `progress_interval` series
    /// sub-steps, in strictly increasing iteration order. Returns
    /// [`Outcome::Cancelled`] as soon as `signal` is observed stopped.
    pub fn compute(
        &self,
        target: u64,
        signal: &RunSignal,
        sink: &mut dyn ProgressSink,
    ) -> EngineResult<Outcome> {
        if target == 0 {
            return Err(EngineError::InvalidDigitCount(0));
        }

        let span = info_span!("pi_run", run_id = %Uuid::new_v4(), target);
        let _guard = span.enter();

        let mut run = PiRun::start(&self.config, target, signal, sink)?;
        info!(
            working_precision = run.working,
            guard_digits = run.guard,
            "Starting calculation"
        );
        let outcome = run.drive()?;

        match &outcome {
            Outcome::Finalized(approximation) => info!(
                outer_iterations = approximation.stats.outer_iterations,
                inner_iterations = approximation.stats.inner_iterations,
                escalations = approximation.stats.escalations,
                guard_extensions = approximation.stats.guard_extensions,
                "Calculation finalized"
            ),
            Outcome::Cancelled {
                working_precision,
                inner_iterations,
            } => info!(
                working_precision,
                inner_iterations, "Calculation cancelled"
            ),
        }
        Ok(outcome)
    }
}

/// Compute pi to `target` digits with default settings, no progress
/// reporting, and no way to cancel.
pub fn compute(target: u64) -> EngineResult<Outcome> {
    PiEngine::default().compute(target, &RunSignal::new(), &mut NullProgress)
}

/// Mutable state of a single calculation.
struct PiRun<'a> {
    target: u64,
    working: u64,
    guard: u64,
    progress_interval: u64,
    /// Series steps taken by the most recent complete pass
    pass_steps: u64,
    refiner: SeriesRefiner,
    candidate: Decimal,
    window: ConvergenceWindow,
    state: EngineState,
    stats: RunStats,
    signal: &'a RunSignal,
    sink: &'a mut dyn ProgressSink,
}

impl<'a> PiRun<'a> {
    fn start(
        config: &EngineConfig,
        target: u64,
        signal: &'a RunSignal,
        sink: &'a mut dyn ProgressSink,
    ) -> EngineResult<Self> {
        let working = config.initial_precision.min(target);
        let context = PrecisionContext::configure(working, config.guard_digits)?;
        let candidate = Decimal::from(INITIAL_CANDIDATE);

        Ok(Self {
            target,
            working,
            guard: config.guard_digits,
            progress_interval: config.progress_interval,
            pass_steps: 0,
            refiner: SeriesRefiner::new(context),
            window: ConvergenceWindow::seeded(candidate.clone()),
            candidate,
            state: EngineState::Running,
            stats: RunStats::default(),
            signal,
            sink,
        })
    }

    fn drive(&mut self) -> EngineResult<Outcome> {
        loop {
            self.enter(EngineState::Running);
            if !self.signal.is_active() {
                return Ok(self.cancel());
            }

            let Some(refined) = self.refine()? else {
                return Ok(self.cancel());
            };

            self.enter(EngineState::Stabilizing);
            let Some(how) = self.stabilization(&refined) else {
                self.advance(refined);
                continue;
            };
            match how {
                Stabilization::Reappeared => self.stats.window_hits += 1,
                Stabilization::Settled => self.stats.settle_hits += 1,
            }

            if self.working < self.target {
                self.enter(EngineState::Escalating);
                self.escalate()?;
                self.advance(refined);
            } else if self.truncation_is_settled(&refined) {
                self.candidate = refined;
                return Ok(self.finalize());
            } else {
                self.enter(EngineState::Escalating);
                self.extend_guard()?;
                self.advance(refined);
            }
        }
    }

    fn enter(&mut self, next: EngineState) {
        if self.state != next {
            debug!(
                from = %self.state,
                to = %next,
                working_precision = self.working,
                "State transition"
            );
            self.state = next;
        }
    }

    /// Run one full refinement pass; `None` if cancelled mid-sum.
    fn refine(&mut self) -> EngineResult<Option<Decimal>> {
        let Self {
            refiner,
            candidate,
            stats,
            sink,
            signal,
            working,
            target,
            progress_interval,
            ..
        } = self;

        let mut steps = 0;
        let result = refiner.refine(
            candidate,
            || signal.is_active(),
            |partial| {
                steps += 1;
                stats.inner_iterations += 1;
                if stats.inner_iterations % *progress_interval == 0 {
                    sink.on_progress(&ProgressUpdate {
                        iteration: stats.inner_iterations,
                        working_precision: *working,
                        target_precision: *target,
                        partial: partial.clone(),
                    });
                }
            },
        )?;

        match result {
            Refinement::Complete(refined) => {
                self.pass_steps = steps;
                self.stats.outer_iterations += 1;
                Ok(Some(refined))
            }
            Refinement::Interrupted => Ok(None),
        }
    }

    fn stabilization(&self, refined: &Decimal) -> Option<Stabilization> {
        if self.window.observe(refined) {
            return Some(Stabilization::Reappeared);
        }

        // The last guard digit can cycle through more values than the window
        // holds, so exact reappearance alone may never fire.
        let change = self.refiner.context().sub(refined, &self.candidate).abs();
        (change <= Decimal::power_of_ten(-(self.working as i64))).then_some(Stabilization::Settled)
    }

    fn advance(&mut self, refined: Decimal) {
        self.window.push(refined.clone());
        self.candidate = refined;
    }

    fn escalate(&mut self) -> EngineResult<()> {
        let next = self.working.saturating_mul(2).min(self.target);
        debug!(from = self.working, to = next, "Escalating working precision");
        self.working = next;
        self.stats.escalations += 1;
        self.reconfigure()
    }

    fn extend_guard(&mut self) -> EngineResult<()> {
        let next = self.guard.saturating_mul(2);
        debug!(
            from = self.guard,
            to = next,
            "Truncation ambiguous, widening guard digits"
        );
        self.guard = next;
        self.stats.guard_extensions += 1;
        self.reconfigure()
    }

    fn reconfigure(&mut self) -> EngineResult<()> {
        let context = PrecisionContext::configure(self.working, self.guard)?;
        self.refiner = SeriesRefiner::new(context);
        Ok(())
    }

    /// Whether truncating `refined` to the target is immune to the residual
    /// error left in the guard digits.
    fn truncation_is_settled(&self, refined: &Decimal) -> bool {
        let ctx = self.refiner.context();
        let margin = self.truncation_margin();
        let low = ctx
            .sub(refined, &margin)
            .to_precision(self.target, Rounding::Down);
        let high = ctx
            .add(refined, &margin)
            .to_precision(self.target, Rounding::Down);
        low == high
    }

    /// Bound on the error of the last pass: grows with the number of rounded
    /// operations it performed, in units of the last carried place.
    fn truncation_margin(&self) -> Decimal {
        let ulps = ULPS_PER_STEP
            .saturating_mul(self.pass_steps)
            .saturating_add(BASE_MARGIN_ULPS);
        Decimal::scaled(ulps, 1 - (self.target + self.guard) as i64)
    }

    fn finalize(&mut self) -> Outcome {
        self.enter(EngineState::Finalized);
        self.stats.final_guard_digits = self.guard;
        Outcome::Finalized(PiApproximation {
            value: self.candidate.to_precision(self.target, Rounding::Down),
            digits: self.target,
            stats: self.stats.clone(),
        })
    }

    fn cancel(&mut self) -> Outcome {
        self.enter(EngineState::Cancelled);
        Outcome::Cancelled {
            working_precision: self.working,
            inner_iterations: self.stats.inner_iterations,
        }
    }
}
