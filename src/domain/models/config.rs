use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for picalc
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Convergence engine tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// Result verification against a reference expansion
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Persistence of the final digits
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Convergence engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Working precision of the first pass (capped at the target)
    #[serde(default = "default_initial_precision")]
    pub initial_precision: u64,

    /// Extra digits carried by every arithmetic operation
    #[serde(default = "default_guard_digits")]
    pub guard_digits: u64,

    /// Emit a progress update every N series sub-steps
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Buffered progress updates between worker and display
    #[serde(default = "default_progress_channel_capacity")]
    pub progress_channel_capacity: usize,
}

const fn default_initial_precision() -> u64 {
    100
}

const fn default_guard_digits() -> u64 {
    2
}

const fn default_progress_interval() -> u64 {
    10
}

const fn default_progress_channel_capacity() -> usize {
    64
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_precision: default_initial_precision(),
            guard_digits: default_guard_digits(),
            progress_interval: default_progress_interval(),
            progress_channel_capacity: default_progress_channel_capacity(),
        }
    }
}

/// Verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VerificationConfig {
    /// Whether to verify finished runs at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Largest digit count for which verification is attempted
    #[serde(default = "default_verification_ceiling")]
    pub ceiling: u64,

    /// Plain-text file holding a long expansion of pi
    #[serde(default = "default_reference_path")]
    pub reference_path: PathBuf,
}

const fn default_true() -> bool {
    true
}

const fn default_verification_ceiling() -> u64 {
    10_000
}

fn default_reference_path() -> PathBuf {
    PathBuf::from("pi_reference.txt")
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            ceiling: default_verification_ceiling(),
            reference_path: default_reference_path(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OutputConfig {
    /// Destination file for the final digits
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Whether to write the final digits at all
    #[serde(default = "default_true")]
    pub save: bool,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("pi.txt")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            save: default_true(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Log file rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}
