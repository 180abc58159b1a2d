//! CalculationRunner - background-worker execution of the pi engine
//!
//! The engine runs on a blocking worker thread and owns all numeric state for
//! the duration of the run. The coordinating task receives:
//! - Progress updates over a bounded channel, in iteration order
//! - The terminal outcome through the worker's join handle
//!
//! The only state shared across threads is the [`RunSignal`], which the
//! coordinator flips to request a stop.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::select;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{EngineConfig, Outcome, ProgressUpdate, RunSignal};
use crate::services::PiEngine;

/// Spawns calculations onto worker threads
#[derive(Debug, Clone)]
pub struct CalculationRunner {
    engine: PiEngine,
    channel_capacity: usize,
}

impl CalculationRunner {
    /// Create a runner; fails on an engine configuration that cannot converge.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let channel_capacity = config.progress_channel_capacity.max(1);
        Ok(Self {
            engine: PiEngine::new(config)?,
            channel_capacity,
        })
    }

    /// Start computing `target` digits on a worker thread.
    ///
    /// A target below one digit is rejected before any thread is started.
    pub fn spawn(&self, target: u64) -> EngineResult<CalculationHandle> {
        if target == 0 {
            return Err(EngineError::InvalidDigitCount(0));
        }

        let signal = RunSignal::new();
        let (progress_tx, progress_rx) = mpsc::channel(self.channel_capacity);
        let dropped = Arc::new(AtomicU64::new(0));

        let engine = self.engine.clone();
        let worker_signal = signal.clone();
        let worker_dropped = Arc::clone(&dropped);

        let join = tokio::task::spawn_blocking(move || {
            let mut sink = |update: &ProgressUpdate| {
                if progress_tx.try_send(update.clone()).is_err() {
                    worker_dropped.fetch_add(1, Ordering::Relaxed);
                    debug!(iteration = update.iteration, "Progress channel full, update dropped");
                }
            };
            engine.compute(target, &worker_signal, &mut sink)
        });

        info!(target, "Calculation worker started");
        Ok(CalculationHandle {
            signal,
            progress_rx,
            join,
            dropped,
        })
    }
}

/// Coordinator's side of a running calculation
pub struct CalculationHandle {
    signal: RunSignal,
    progress_rx: mpsc::Receiver<ProgressUpdate>,
    join: JoinHandle<EngineResult<Outcome>>,
    dropped: Arc<AtomicU64>,
}

impl CalculationHandle {
    /// Request a stop. The worker halts within two arithmetic operations.
    pub fn stop(&self) {
        self.signal.stop();
    }

    /// The shared run signal, for stopping from elsewhere.
    pub fn signal(&self) -> RunSignal {
        self.signal.clone()
    }

    /// Progress updates the worker could not enqueue because the channel was full
    pub fn dropped_updates(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Deliver progress to `on_progress` until the worker finishes.
    ///
    /// When `shutdown` resolves the run is asked to stop; the worker still
    /// runs to its (cancelled) outcome, which is returned as usual. Updates
    /// still queued when the worker finishes are delivered before returning.
    pub async fn drive<P, S>(mut self, mut on_progress: P, shutdown: S) -> Result<Outcome>
    where
        P: FnMut(&ProgressUpdate),
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stop_requested = false;

        let joined = loop {
            select! {
                Some(update) = self.progress_rx.recv() => on_progress(&update),

                () = &mut shutdown, if !stop_requested => {
                    info!("Shutdown requested, stopping calculation");
                    stop_requested = true;
                    self.signal.stop();
                }

                joined = &mut self.join => break joined,
            }
        };

        while let Ok(update) = self.progress_rx.try_recv() {
            on_progress(&update);
        }

        let dropped = self.dropped_updates();
        if dropped > 0 {
            debug!(dropped, "Progress updates dropped during run");
        }

        let outcome = joined.context("Calculation worker panicked")??;
        Ok(outcome)
    }

    /// Wait for the outcome, discarding progress.
    pub async fn wait(self) -> Result<Outcome> {
        self.drive(|_| {}, std::future::pending()).await
    }
}
