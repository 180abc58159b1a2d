//! Domain layer for the pi calculator
//!
//! This module contains the core models, errors, and ports. It has no
//! knowledge of terminals, files, or threads.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{validate_digit_count, EngineError, EngineResult};
