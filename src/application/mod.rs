pub mod calculation_runner;

pub use calculation_runner::{CalculationHandle, CalculationRunner};
