pub mod convergence_tracker;
pub mod escalation_scheduler;
pub mod precision;
pub mod series_refiner;
pub mod verifier;

pub use convergence_tracker::{ConvergenceWindow, WINDOW_CAPACITY};
pub use escalation_scheduler::{compute, PiEngine};
pub use precision::{Decimal, ParseDecimalError, PrecisionContext, Rounding};
pub use series_refiner::{Refinement, SeriesRefiner};
pub use verifier::Verifier;
