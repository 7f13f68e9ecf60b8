//! Integration tests for the background idle sweeper.

#![cfg(feature = "async")]

use std::time::{Duration, Instant};
use window_admission::{AdmissionEngine, IdleSweeper, SweeperConfigError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("window_admission=debug")
        .with_test_writer()
        .try_init();
}

fn engine(window: Duration, retention: Duration) -> AdmissionEngine<String> {
    AdmissionEngine::builder(2, window)
        .with_retention(retention)
        .build()
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sweeper_reclaims_one_off_callers() {
    init_tracing();
    let engine = engine(Duration::from_millis(20), Duration::from_millis(20));

    for i in 0..500 {
        assert!(engine.check_and_record_now(&format!("caller-{}", i)));
    }
    assert_eq!(engine.tracked_identities(), 500);

    let handle = engine.spawn_sweeper(Duration::from_millis(10)).unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(engine.tracked_identities(), 0);
    assert_eq!(engine.metrics().identities_evicted(), 500);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_decisions_unaffected_while_sweeping() {
    let engine = engine(Duration::from_secs(60), Duration::from_millis(1));
    let handle = engine.spawn_sweeper(Duration::from_millis(5)).unwrap();

    let t0 = Instant::now();
    assert!(engine.check_and_record("user1", t0));
    tokio::time::sleep(Duration::from_millis(30)).await;

    // Live entries are never swept, so the quota still applies
    assert!(engine.check_and_record("user1", t0));
    assert!(!engine.check_and_record("user1", t0));
    assert_eq!(engine.tracked_identities(), 1);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_sweeper_without_retention_is_harmless() {
    let engine = AdmissionEngine::<String>::new(1, Duration::from_millis(1)).unwrap();
    engine.check_and_record_now("user1");

    let handle = engine.spawn_sweeper(Duration::from_millis(5)).unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(engine.tracked_identities(), 1);
    assert_eq!(engine.metrics().sweeps_completed(), 0);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_dropping_handle_stops_sweeper() {
    let engine = engine(Duration::from_millis(1), Duration::from_millis(1));
    let handle = IdleSweeper::new(engine.clone(), Duration::from_millis(5))
        .unwrap()
        .start();
    assert!(handle.is_running());

    drop(handle);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let sweeps = engine.metrics().sweeps_completed();
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(engine.metrics().sweeps_completed(), sweeps);
}

#[test]
fn test_zero_interval_is_rejected() {
    let engine = engine(Duration::from_secs(1), Duration::from_secs(1));
    assert!(matches!(
        engine.spawn_sweeper(Duration::ZERO),
        Err(SweeperConfigError::ZeroInterval)
    ));
}
