//! Property tests for the sliding-window admission rules.

use proptest::prelude::*;
use std::time::{Duration, Instant};
use window_admission::AdmissionEngine;

/// Straightforward reference model: keep every admitted instant still inside
/// the window relative to the call's `now`, admit while under the quota.
#[derive(Default)]
struct Model {
    admitted: Vec<Instant>,
}

impl Model {
    fn check_and_record(&mut self, now: Instant, max_requests: usize, window: Duration) -> bool {
        self.admitted
            .retain(|t| now.saturating_duration_since(*t) < window);
        if self.admitted.len() < max_requests {
            self.admitted.push(now);
            true
        } else {
            false
        }
    }
}

fn calls() -> impl Strategy<Value = Vec<(u8, u64)>> {
    prop::collection::vec((0u8..3, 0u64..5_000), 1..200)
}

proptest! {
    #[test]
    fn test_retained_never_exceeds_quota(
        max_requests in 1usize..8,
        window_ms in 1u64..2_000,
        calls in calls(),
    ) {
        let engine = AdmissionEngine::<u8>::new(max_requests, Duration::from_millis(window_ms)).unwrap();
        let t0 = Instant::now();

        for (identity, offset_ms) in calls {
            engine.check_and_record(&identity, t0 + Duration::from_millis(offset_ms));
            prop_assert!(engine.retained(&identity) <= max_requests);
        }
    }

    #[test]
    fn test_matches_reference_model(
        max_requests in 1usize..8,
        window_ms in 1u64..2_000,
        calls in calls(),
    ) {
        let window = Duration::from_millis(window_ms);
        let engine = AdmissionEngine::<u8>::new(max_requests, window).unwrap();
        let mut models: [Model; 3] = Default::default();
        let t0 = Instant::now();

        for (identity, offset_ms) in calls {
            let now = t0 + Duration::from_millis(offset_ms);
            let expected = models[identity as usize].check_and_record(now, max_requests, window);
            prop_assert_eq!(engine.check_and_record(&identity, now), expected);
        }
    }

    #[test]
    fn test_under_capacity_is_admitted_and_cutoff_is_hard(
        max_requests in 1usize..50,
        window_ms in 1u64..10_000,
    ) {
        let engine = AdmissionEngine::<String>::new(max_requests, Duration::from_millis(window_ms)).unwrap();
        let now = Instant::now();

        for _ in 0..max_requests {
            prop_assert!(engine.check_and_record("user", now));
        }
        prop_assert!(!engine.check_and_record("user", now));
    }

    #[test]
    fn test_boundary_and_recovery(
        max_requests in 1usize..10,
        window_ms in 1u64..10_000,
        before_ms in 0u64..10_000,
    ) {
        let window = Duration::from_millis(window_ms);
        let engine = AdmissionEngine::<String>::new(max_requests, window).unwrap();
        let t0 = Instant::now() + Duration::from_millis(before_ms);

        for _ in 0..max_requests {
            engine.check_and_record("user", t0);
        }

        // Still counted just before t0 + window
        prop_assert!(!engine.check_and_record("user", t0 + window - Duration::from_nanos(1)));
        // Expired at exactly t0 + window
        prop_assert!(engine.check_and_record("user", t0 + window));
    }

    #[test]
    fn test_monotonic_sequences_respect_every_trailing_window(
        max_requests in 1usize..6,
        window_ms in 10u64..500,
        gaps in prop::collection::vec(0u64..200, 1..150),
    ) {
        let window = Duration::from_millis(window_ms);
        let engine = AdmissionEngine::<String>::new(max_requests, window).unwrap();
        let t0 = Instant::now();

        let mut now = t0;
        let mut admitted = Vec::new();
        for gap in gaps {
            now += Duration::from_millis(gap);
            if engine.check_and_record("user", now) {
                admitted.push(now);
            }
        }

        for &end in &admitted {
            let in_window = admitted
                .iter()
                .filter(|&&t| t <= end && end.duration_since(t) < window)
                .count();
            prop_assert!(in_window <= max_requests);
        }
    }
}
