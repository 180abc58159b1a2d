//! Implementation of the `picalc <DIGITS>` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::application::CalculationRunner;
use crate::cli::display::{action_failure, action_skipped, action_success, format_elapsed};
use crate::cli::output::progress::PrecisionProgress;
use crate::cli::output::{output, CommandOutput};
use crate::cli::types::{Cli, ExecutionMode};
use crate::domain::errors::validate_digit_count;
use crate::domain::models::{
    Config, EngineConfig, Outcome, PiApproximation, ProgressUpdate, RunSignal, RunStats,
    Verification,
};
use crate::domain::ports::ResultStore;
use crate::infrastructure::storage::{FileReference, FileResultStore};
use crate::services::{PiEngine, Verifier};

/// Everything one run needs, after merging CLI flags over configuration.
#[derive(Debug, Clone)]
pub struct ComputeSettings {
    pub target: u64,
    pub mode: ExecutionMode,
    pub engine: EngineConfig,
    pub verifier: Verifier,
    pub reference_path: PathBuf,
    /// Destination for the digits; `None` when persistence is off
    pub save_to: Option<PathBuf>,
}

impl ComputeSettings {
    /// Merge `cli` over `config`, rejecting a digit count below one.
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let target = validate_digit_count(cli.digits)?;

        let verifier = if cli.no_verify {
            Verifier::new(0)
        } else {
            Verifier::from_config(&config.verification)
        };
        let save_to = (!cli.no_save && config.output.save)
            .then(|| cli.output.clone().unwrap_or_else(|| config.output.path.clone()));

        Ok(Self {
            target,
            mode: cli.mode,
            engine: config.engine.clone(),
            verifier,
            reference_path: cli
                .reference
                .clone()
                .unwrap_or_else(|| config.verification.reference_path.clone()),
            save_to,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Finalized,
    Cancelled,
}

#[derive(Debug, Serialize)]
pub struct ComputeOutput {
    pub status: RunStatus,
    pub digits: u64,
    pub mode: ExecutionMode,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    /// Final digit string; absent when cancelled
    pub value: Option<String>,
    pub stats: Option<RunStats>,
    /// Working precision reached before a cancellation
    pub cancelled_at_precision: Option<u64>,
    pub verification: Option<Verification>,
    pub saved_to: Option<PathBuf>,
    /// Non-fatal problem writing the digits
    pub save_error: Option<String>,
}

impl ComputeOutput {
    fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    fn verification_line(&self) -> Option<String> {
        match self.verification.as_ref()? {
            Verification::Checked {
                matched: true,
                ..
            } => Some(action_success(&format!(
                "Verified {} digits against reference",
                self.digits
            ))),
            Verification::Checked {
                first_mismatch_index,
                ..
            } => Some(action_failure(&format!(
                "Mismatch with reference at position {}",
                first_mismatch_index.map_or_else(|| "?".to_string(), |i| i.to_string())
            ))),
            Verification::Unavailable { reason } => {
                Some(action_skipped(&format!("Verification skipped: {reason}")))
            }
        }
    }
}

impl CommandOutput for ComputeOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();

        match self.status {
            RunStatus::Cancelled => {
                lines.push(action_skipped(&format!(
                    "Calculation cancelled at working precision {} after {}",
                    self.cancelled_at_precision.unwrap_or(0),
                    format_elapsed(self.elapsed())
                )));
                return lines.join("\n");
            }
            RunStatus::Finalized => {
                if let Some(value) = &self.value {
                    lines.push(value.clone());
                }
            }
        }

        if let Some(line) = self.verification_line() {
            lines.push(line);
        }
        if let Some(path) = &self.saved_to {
            lines.push(action_success(&format!("Saved to {}", path.display())));
        }
        if let Some(error) = &self.save_error {
            lines.push(action_failure(&format!("Not saved: {error}")));
        }

        let summary = self.stats.as_ref().map_or_else(String::new, |stats| {
            format!(
                " ({} passes, {} series steps, {} escalations)",
                stats.outer_iterations, stats.inner_iterations, stats.escalations
            )
        });
        lines.push(format!(
            "Finished in {}{summary}",
            format_elapsed(self.elapsed())
        ));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(cli: &Cli, config: Config) -> Result<()> {
    let settings = ComputeSettings::resolve(cli, &config)?;
    let output_data = run(&settings, cli.json).await?;
    output(&output_data, cli.json);
    Ok(())
}

/// Run one calculation end to end: compute, verify, persist.
///
/// Only invalid configuration is an error here. Cancellation, verification
/// mismatches, and storage failures are all reported in the output.
pub async fn run(settings: &ComputeSettings, json_mode: bool) -> Result<ComputeOutput> {
    let started_at = Utc::now();
    let display = if json_mode {
        PrecisionProgress::hidden(settings.target)
    } else {
        PrecisionProgress::new(settings.target)
    };

    let outcome = match settings.mode {
        ExecutionMode::Inline => run_inline(settings, &display).await?,
        ExecutionMode::Worker => run_worker(settings, &display).await?,
    };
    let elapsed_ms = u64::try_from(display.elapsed().as_millis()).unwrap_or(u64::MAX);

    let pi = match outcome {
        Outcome::Finalized(pi) => pi,
        Outcome::Cancelled {
            working_precision, ..
        } => {
            display.finish_cancelled();
            return Ok(ComputeOutput {
                status: RunStatus::Cancelled,
                digits: settings.target,
                mode: settings.mode,
                started_at,
                elapsed_ms,
                value: None,
                stats: None,
                cancelled_at_precision: Some(working_precision),
                verification: None,
                saved_to: None,
                save_error: None,
            });
        }
    };
    display.finish_success(format!("{} digits", settings.target));

    let reference = FileReference::new(&settings.reference_path);
    let verification = settings.verifier.verify_against(&pi, &reference).await;
    let (saved_to, save_error) = persist(settings, &pi).await;

    Ok(ComputeOutput {
        status: RunStatus::Finalized,
        digits: settings.target,
        mode: settings.mode,
        started_at,
        elapsed_ms,
        value: Some(pi.digit_string()),
        stats: Some(pi.stats),
        cancelled_at_precision: None,
        verification: Some(verification),
        saved_to,
        save_error,
    })
}

/// Engine on this thread; Ctrl-C flips the run signal from a spawned task.
///
/// Needs the multi-threaded runtime.
async fn run_inline(settings: &ComputeSettings, display: &PrecisionProgress) -> Result<Outcome> {
    let engine = PiEngine::new(settings.engine.clone()).context("Invalid engine configuration")?;
    let signal = RunSignal::new();

    let stopper = signal.clone();
    let watcher = tokio::spawn(async move {
        shutdown_requested().await;
        info!("Interrupt received, stopping calculation");
        stopper.stop();
    });

    let mut sink = |update: &ProgressUpdate| display.on_update(update);
    let outcome =
        tokio::task::block_in_place(|| engine.compute(settings.target, &signal, &mut sink));
    watcher.abort();

    Ok(outcome?)
}

/// Engine on a worker thread; this task owns the display.
async fn run_worker(settings: &ComputeSettings, display: &PrecisionProgress) -> Result<Outcome> {
    let runner =
        CalculationRunner::new(settings.engine.clone()).context("Invalid engine configuration")?;
    let handle = runner.spawn(settings.target)?;
    handle
        .drive(
            |update: &ProgressUpdate| display.on_update(update),
            shutdown_requested(),
        )
        .await
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
async fn shutdown_requested() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn persist(
    settings: &ComputeSettings,
    pi: &PiApproximation,
) -> (Option<PathBuf>, Option<String>) {
    let Some(path) = &settings.save_to else {
        return (None, None);
    };

    let store = FileResultStore::new(path);
    match store.save(&pi.digit_string()).await {
        Ok(path) => (Some(path), None),
        Err(e) => {
            warn!(path = %store.destination().display(), error = %e, "Result not saved");
            (None, Some(e.to_string()))
        }
    }
}
