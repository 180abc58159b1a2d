pub mod config;
pub mod run;
pub mod verification;

pub use config::{
    Config, EngineConfig, LogFormat, LoggingConfig, OutputConfig, RotationPolicy,
    VerificationConfig,
};
pub use run::{EngineState, Outcome, PiApproximation, ProgressUpdate, RunSignal, RunStats};
pub use verification::{UnavailableReason, Verification};
