//! Per-identity sliding window state.
//!
//! A [`WindowState`] holds the instants of previously admitted requests for
//! one identity, sorted ascending. The window is half-open: at instant `now`
//! an entry `t` is counted iff `now - window < t`, so an entry exactly
//! `window` old has already expired.

use crate::domain::decision::AdmissionDecision;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Recent admitted-event instants for one caller identity.
///
/// States are owned by the engine's registry and only mutated inside an
/// identity's critical section. Outside the crate they are read through
/// [`AdmissionEngine::snapshot`](crate::AdmissionEngine::snapshot).
///
/// # Example
/// ```
/// use window_admission::AdmissionEngine;
/// use std::time::{Duration, Instant};
///
/// let window = Duration::from_secs(60);
/// let engine = AdmissionEngine::<String>::new(2, window).unwrap();
/// let start = Instant::now();
///
/// engine.check_and_record("user1", start);
/// engine.check_and_record("user1", start + Duration::from_secs(10));
///
/// let state = engine.snapshot("user1").unwrap();
/// assert_eq!(state.len(), 2);
/// assert_eq!(state.oldest(), Some(start));
/// assert_eq!(state.retry_after(start + Duration::from_secs(15), window), Duration::from_secs(45));
/// ```
#[derive(Debug, Clone)]
pub struct WindowState {
    timestamps: VecDeque<Instant>,
    last_access: Instant,
}

impl WindowState {
    /// Create an empty state first observed at `now`.
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            timestamps: VecDeque::new(),
            last_access: now,
        }
    }

    /// Remove expired entries, returning how many were removed.
    ///
    /// Entries are sorted, so the expired ones always form a prefix and the
    /// scan stops at the first entry still inside the window.
    pub(crate) fn prune(&mut self, now: Instant, window: Duration) -> usize {
        let mut removed = 0;
        while let Some(&oldest) = self.timestamps.front() {
            if is_expired(oldest, now, window) {
                self.timestamps.pop_front();
                removed += 1;
            } else {
                break;
            }
        }
        removed
    }

    /// Prune, then admit and record `now` if fewer than `max_requests`
    /// entries remain.
    ///
    /// A rejection leaves the retained entries exactly as pruning left them.
    pub(crate) fn check_and_record(
        &mut self,
        now: Instant,
        max_requests: usize,
        window: Duration,
    ) -> AdmissionDecision {
        self.last_access = self.last_access.max(now);
        self.prune(now, window);

        if self.timestamps.len() < max_requests {
            self.record(now);
            AdmissionDecision::Admitted
        } else {
            AdmissionDecision::Rejected {
                retry_after: self.retry_after(now, window),
            }
        }
    }

    /// Time until the oldest retained entry leaves the window.
    ///
    /// Zero when nothing is retained or the oldest entry is already expired.
    pub fn retry_after(&self, now: Instant, window: Duration) -> Duration {
        self.timestamps.front().map_or(Duration::ZERO, |&oldest| {
            window.saturating_sub(now.saturating_duration_since(oldest))
        })
    }

    /// Whether this state can be dropped without changing any future decision.
    ///
    /// True iff every retained entry has expired at `now` and the identity
    /// has not been seen for at least `retention`.
    pub fn is_idle(&self, now: Instant, window: Duration, retention: Duration) -> bool {
        let drained = self
            .newest()
            .is_none_or(|newest| is_expired(newest, now, window));

        drained && now.saturating_duration_since(self.last_access) >= retention
    }

    /// Most recently recorded instant.
    pub fn newest(&self) -> Option<Instant> {
        self.timestamps.back().copied()
    }

    /// Oldest retained instant.
    pub fn oldest(&self) -> Option<Instant> {
        self.timestamps.front().copied()
    }

    /// Instant of the latest decision made for this identity.
    pub fn last_access(&self) -> Instant {
        self.last_access
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if no entries are retained.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Retained entries, oldest first.
    pub fn timestamps(&self) -> impl Iterator<Item = Instant> + '_ {
        self.timestamps.iter().copied()
    }

    // An instant older than the newest entry goes to its sorted position so
    // that pruning can keep treating expired entries as a prefix.
    fn record(&mut self, now: Instant) {
        match self.timestamps.back() {
            Some(&newest) if newest > now => {
                let index = self.timestamps.partition_point(|&t| t <= now);
                self.timestamps.insert(index, now);
            }
            _ => self.timestamps.push_back(now),
        }
    }
}

fn is_expired(entry: Instant, now: Instant, window: Duration) -> bool {
    now.saturating_duration_since(entry) >= window
}
