//! CLI type definitions
//!
//! This module contains the clap structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "picalc")]
#[command(about = "Compute pi to an arbitrary number of digits", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Number of significant digits to compute
    #[arg(allow_negative_numbers = true)]
    pub digits: i64,

    /// File to write the digits to (overrides output.path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not write the digits to a file
    #[arg(long)]
    pub no_save: bool,

    /// Reference expansion of pi (overrides verification.reference_path)
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Skip verification against the reference
    #[arg(long)]
    pub no_verify: bool,

    /// Where the engine runs
    #[arg(short, long, value_enum, default_value_t = ExecutionMode::Worker)]
    pub mode: ExecutionMode,

    /// Load configuration from this YAML file instead of .picalc/
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long)]
    pub json: bool,
}

/// Execution mode of the engine
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// On the calling thread, drawing progress synchronously
    Inline,
    /// On a background worker, progress delivered over a channel
    Worker,
}
