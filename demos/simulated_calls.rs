//! Simulated callers hitting a sliding-window admission engine.
//!
//! Two users share an engine allowing 5 calls per 60 seconds. Time is
//! simulated by passing explicit instants, so the demo runs instantly.
//!
//! Run with `RUST_LOG=window_admission=trace` to see rejection events.

use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;
use window_admission::{AdmissionDecision, AdmissionEngine};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let engine = AdmissionEngine::<String>::builder(5, Duration::from_secs(60))
        .with_retention(Duration::from_secs(120))
        .build()
        .expect("valid limiter configuration");

    println!("=== Sliding Window Admission Demo ===\n");
    println!("Limit: 5 calls per user per 60s\n");

    let t0 = Instant::now();
    let at = |secs: u64| t0 + Duration::from_secs(secs);

    println!("user1 makes 6 calls at t=0s:");
    for i in 1..=6 {
        report(&engine, "user1", i, 0, engine.decide("user1", at(0)));
    }

    println!("\nuser2 is unaffected at t=0s:");
    report(&engine, "user2", 1, 0, engine.decide("user2", at(0)));

    println!("\nuser1 keeps trying every 20s:");
    for (i, secs) in [20, 40, 61].into_iter().enumerate() {
        report(&engine, "user1", i + 7, secs, engine.decide("user1", at(secs)));
    }

    // A slow request occupies its slot only from the moment it was admitted
    println!("\nuser2 starts a long request at t=10s, then calls again at t=15s:");
    report(&engine, "user2", 2, 10, engine.decide("user2", at(10)));
    report(&engine, "user2", 3, 15, engine.decide("user2", at(15)));

    println!("\nIdle sweep at t=300s:");
    let evicted = engine.evict_idle(at(300));
    info!(evicted, remaining = engine.tracked_identities(), "sweep finished");

    let metrics = engine.metrics().snapshot();
    println!("\n=== Demo Complete ===");
    println!(
        "admitted: {}, rejected: {}, rejection rate: {:.0}%",
        metrics.requests_admitted,
        metrics.requests_rejected,
        metrics.rejection_rate() * 100.0
    );
}

fn report(
    engine: &AdmissionEngine<String>,
    user: &str,
    call: usize,
    secs: u64,
    decision: AdmissionDecision,
) {
    match decision {
        AdmissionDecision::Admitted => println!(
            "  t={:>3}s {} call {:>2}: admitted ({} in window)",
            secs,
            user,
            call,
            engine.retained(user)
        ),
        AdmissionDecision::Rejected { retry_after } => println!(
            "  t={:>3}s {} call {:>2}: rejected, retry in {}s",
            secs,
            user,
            call,
            retry_after.as_secs()
        ),
    }
}
