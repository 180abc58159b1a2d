//! Background-worker execution mode.

mod common;

use common::{finalized, pi_truncated};
use picalc::{CalculationRunner, EngineConfig, EngineError, ProgressUpdate};

fn runner(initial_precision: u64, progress_interval: u64, capacity: usize) -> CalculationRunner {
    CalculationRunner::new(EngineConfig {
        initial_precision,
        progress_interval,
        progress_channel_capacity: capacity,
        ..EngineConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_worker_delivers_ordered_progress_and_result() {
    let handle = runner(20, 5, 1024).spawn(300).unwrap();

    let mut seen: Vec<(u64, u64)> = Vec::new();
    let outcome = handle
        .drive(
            |update: &ProgressUpdate| seen.push((update.iteration, update.working_precision)),
            std::future::pending(),
        )
        .await
        .unwrap();

    assert_eq!(finalized(outcome).digit_string(), pi_truncated(300));
    assert!(!seen.is_empty());
    for pair in seen.windows(2) {
        assert!(pair[0].0 < pair[1].0);
        assert!(pair[0].1 <= pair[1].1);
    }
    assert!(seen.iter().any(|&(_, working)| working > 20));
}

#[tokio::test]
async fn test_stop_cancels_run() {
    let handle = runner(100, 10, 64).spawn(5000).unwrap();
    handle.stop();

    let outcome = handle.wait().await.unwrap();
    assert!(outcome.is_cancelled());
    assert!(outcome.approximation().is_none());
}

#[tokio::test]
async fn test_stop_from_progress_callback() {
    let handle = runner(100, 1, 64).spawn(5000).unwrap();
    let signal = handle.signal();

    let outcome = handle
        .drive(
            |_: &ProgressUpdate| signal.stop(),
            std::future::pending(),
        )
        .await
        .unwrap();
    assert!(outcome.is_cancelled());
}

#[tokio::test]
async fn test_shutdown_future_stops_worker() {
    let handle = runner(100, 10, 64).spawn(5000).unwrap();

    let outcome = handle.drive(|_: &ProgressUpdate| {}, async {}).await.unwrap();
    assert!(outcome.is_cancelled());
}

#[tokio::test]
async fn test_full_channel_drops_but_keeps_order() {
    // One slot and an update per step: the worker outpaces the consumer.
    let handle = runner(50, 1, 1).spawn(400).unwrap();

    let mut iterations = Vec::new();
    let outcome = handle
        .drive(
            |update: &ProgressUpdate| iterations.push(update.iteration),
            std::future::pending(),
        )
        .await
        .unwrap();

    assert_eq!(finalized(outcome).digit_string(), pi_truncated(400));
    assert!(iterations.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_rejects_zero_digits() {
    assert!(matches!(
        runner(100, 10, 64).spawn(0),
        Err(EngineError::InvalidDigitCount(0))
    ));
}
