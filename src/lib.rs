//! picalc - arbitrary-precision pi calculator
//!
//! picalc computes pi to any number of significant digits by iterating
//! `x + sin(x)` from 3 under escalating decimal precision, reporting progress
//! as it goes and optionally verifying the result against a reference file.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors, and port traits
//! - **Service Layer** (`services`): decimal arithmetic, the series refiner,
//!   convergence tracking, the escalation scheduler, and the verifier
//! - **Application Layer** (`application`): background-worker execution
//! - **Infrastructure Layer** (`infrastructure`): config, logging, and files
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```
//! use picalc::services::compute;
//!
//! let outcome = compute(10).unwrap();
//! assert_eq!(outcome.approximation().unwrap().digit_string(), "3.141592653");
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{CalculationHandle, CalculationRunner};
pub use domain::errors::{EngineError, EngineResult};
pub use domain::models::{
    Config, EngineConfig, Outcome, PiApproximation, ProgressUpdate, RunSignal, RunStats,
    UnavailableReason, Verification,
};
pub use domain::ports::{ProgressSink, ReferenceSource, ResultStore, StorageError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{compute, Decimal, PiEngine, PrecisionContext, Verifier};
