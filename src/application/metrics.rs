//! Observability metrics for admission control.
//!
//! Provides counters about admission behavior for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking admission statistics.
///
/// All metrics use relaxed atomics: they are monotonic counters read for
/// observability and never used to make a decision.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    requests_admitted: AtomicU64,
    requests_rejected: AtomicU64,
    identities_evicted: AtomicU64,
    sweeps_completed: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_admitted(&self) {
        self.inner.requests_admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.inner.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one completed idle sweep and how many identities it removed.
    pub(crate) fn record_sweep(&self, evicted: usize) {
        self.inner
            .identities_evicted
            .fetch_add(evicted as u64, Ordering::Relaxed);
        self.inner.sweeps_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of admitted requests.
    pub fn requests_admitted(&self) -> u64 {
        self.inner.requests_admitted.load(Ordering::Relaxed)
    }

    /// Get the total number of rejected requests.
    pub fn requests_rejected(&self) -> u64 {
        self.inner.requests_rejected.load(Ordering::Relaxed)
    }

    /// Get the total number of identities removed by idle sweeps.
    pub fn identities_evicted(&self) -> u64 {
        self.inner.identities_evicted.load(Ordering::Relaxed)
    }

    /// Get the number of idle sweeps run so far.
    pub fn sweeps_completed(&self) -> u64 {
        self.inner.sweeps_completed.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_admitted: self.requests_admitted(),
            requests_rejected: self.requests_rejected(),
            identities_evicted: self.identities_evicted(),
            sweeps_completed: self.sweeps_completed(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.requests_admitted.store(0, Ordering::Relaxed);
        self.inner.requests_rejected.store(0, Ordering::Relaxed);
        self.inner.identities_evicted.store(0, Ordering::Relaxed);
        self.inner.sweeps_completed.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total number of admitted requests
    pub requests_admitted: u64,
    /// Total number of rejected requests
    pub requests_rejected: u64,
    /// Total number of identities removed by idle sweeps
    pub identities_evicted: u64,
    /// Number of idle sweeps run
    pub sweeps_completed: u64,
}

impl MetricsSnapshot {
    /// Total number of decisions (admitted + rejected).
    pub fn total_decisions(&self) -> u64 {
        self.requests_admitted.saturating_add(self.requests_rejected)
    }

    /// Fraction of decisions that were rejections (0.0 to 1.0).
    ///
    /// Returns 0.0 if no decisions have been made.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.total_decisions();
        if total == 0 {
            0.0
        } else {
            self.requests_rejected as f64 / total as f64
        }
    }
}
