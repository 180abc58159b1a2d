//! One refinement step of the fixed-point iteration.
//!
//! Given a candidate `x`, the refiner sums `x + sin(x)` as the alternating
//! series `2x - x^3/3! + x^5/5! - ...`, two terms per loop iteration, until
//! the running term drops below the context threshold. Iterating this map
//! converges to pi.

use crate::domain::errors::EngineResult;
use crate::services::precision::{Decimal, PrecisionContext};

/// Result of one refinement pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refinement {
    /// The series was summed down to the threshold.
    Complete(Decimal),
    /// Cancellation was observed mid-sum; the partial sum is discarded.
    Interrupted,
}

/// Sums the refinement series under a fixed precision context.
#[derive(Debug, Clone)]
pub struct SeriesRefiner {
    context: PrecisionContext,
    threshold: Decimal,
}

impl SeriesRefiner {
    /// Refiner whose termination threshold is `10^-digits` of the context.
    pub fn new(context: PrecisionContext) -> Self {
        let threshold = context.threshold();
        Self { context, threshold }
    }

    pub fn context(&self) -> &PrecisionContext {
        &self.context
    }

    pub fn threshold(&self) -> &Decimal {
        &self.threshold
    }

    /// Produce the next candidate from `candidate`.
    ///
    /// `is_active` is consulted before every sub-step so a stop request is
    /// honoured within two multiply/divide operations. `on_step` receives the
    /// accumulator after every full iteration (two sub-steps).
    pub fn refine<A, S>(
        &self,
        candidate: &Decimal,
        is_active: A,
        mut on_step: S,
    ) -> EngineResult<Refinement>
    where
        A: Fn() -> bool,
        S: FnMut(&Decimal),
    {
        let ctx = &self.context;
        let square = ctx.mul(candidate, candidate);
        let mut term = candidate.clone();
        let mut acc = ctx.add(candidate, &term);
        let mut count: u128 = 1;

        while term.abs() > self.threshold {
            if !is_active() {
                return Ok(Refinement::Interrupted);
            }
            let factor = ctx.div(&square, &Decimal::from((count + 1) * (count + 2)))?;
            term = ctx.mul(&term, &factor);
            acc = ctx.sub(&acc, &term);

            if !is_active() {
                return Ok(Refinement::Interrupted);
            }
            let factor = ctx.div(&square, &Decimal::from((count + 3) * (count + 4)))?;
            term = ctx.mul(&term, &factor);
            acc = ctx.add(&acc, &term);

            count += 4;
            on_step(&acc);
        }

        Ok(Refinement::Complete(acc))
    }
}
