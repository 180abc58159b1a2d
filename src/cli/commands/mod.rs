//! CLI command implementations.

pub mod compute;
