//! Admission engine coordination logic.
//!
//! The engine owns the prune/check/record decision for each identity and
//! keeps the metrics and the optional lazy idle sweep.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, Storage};
use crate::application::registry::WindowRegistry;
use crate::domain::{config::LimiterConfig, decision::AdmissionDecision, window::WindowState};
use crate::infrastructure::storage::ShardedStorage;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Per-identity sliding-window admission engine.
///
/// Admits at most `max_requests` requests per identity within any trailing
/// `window`. Decisions for one identity are linearizable: the whole
/// prune/compare/append sequence runs while that identity's lock stripe is
/// held, so concurrent callers can never push an identity past its quota.
/// Identities on different stripes decide in parallel.
///
/// Admission is accounted at arrival. A request that takes minutes to
/// complete occupies exactly one slot from the instant it was admitted until
/// that slot ages out of the window; there is no release operation.
///
/// Cloning an engine is cheap and every clone shares the same state.
///
/// # Example
/// ```
/// use window_admission::AdmissionEngine;
/// use std::time::{Duration, Instant};
///
/// let engine = AdmissionEngine::<String>::new(5, Duration::from_secs(60)).unwrap();
/// let t0 = Instant::now();
///
/// for _ in 0..5 {
///     assert!(engine.check_and_record("user1", t0));
/// }
/// assert!(!engine.check_and_record("user1", t0));
///
/// // Other identities are unaffected
/// assert!(engine.check_and_record("user2", t0));
///
/// // Once the window has passed, user1 is admitted again
/// assert!(engine.check_and_record("user1", t0 + Duration::from_secs(61)));
/// ```
pub struct AdmissionEngine<K, S = Arc<ShardedStorage<K, WindowState>>>
where
    K: Hash + Eq + Send + Sync,
    S: Storage<K, WindowState> + Clone,
{
    registry: WindowRegistry<K, S>,
    config: LimiterConfig,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
    lazy_sweep: Option<LazySweep>,
}

#[derive(Debug, Clone)]
struct LazySweep {
    every: u64,
    decisions: Arc<AtomicU64>,
}

impl<K, S> AdmissionEngine<K, S>
where
    K: Hash + Eq + Send + Sync,
    S: Storage<K, WindowState> + Clone,
{
    /// Assemble an engine from an existing registry.
    ///
    /// # Arguments
    /// * `registry` - The state store
    /// * `config` - Validated limiter configuration
    /// * `clock` - Clock used by the `*_now` entry points and the sweeper
    pub fn from_parts(
        registry: WindowRegistry<K, S>,
        config: LimiterConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            config,
            clock,
            metrics: Metrics::new(),
            lazy_sweep: None,
        }
    }

    /// Run an idle sweep every `every` decisions.
    ///
    /// Has no effect unless the configuration sets a retention horizon.
    pub(crate) fn with_lazy_sweep(mut self, every: u64) -> Self {
        self.lazy_sweep = Some(LazySweep {
            every,
            decisions: Arc::new(AtomicU64::new(0)),
        });
        self
    }

    /// Decide whether `identity` may perform one more operation at `now`,
    /// recording it if so.
    ///
    /// # Returns
    /// `true` if admitted (and recorded), `false` if rejected (nothing recorded).
    pub fn check_and_record<Q>(&self, identity: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        self.decide(identity, now).is_admitted()
    }

    /// Same decision as [`check_and_record`](Self::check_and_record), with a
    /// backoff hint on rejection.
    ///
    /// `now` is not required to be monotonic. Pruning and counting both use
    /// the supplied instant, so each decision is internally consistent, but
    /// a caller whose clock goes backwards sees entries from its own "future"
    /// counted until they age out relative to later instants.
    pub fn decide<Q>(&self, identity: &Q, now: Instant) -> AdmissionDecision
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let max_requests = self.config.max_requests();
        let window = self.config.window();

        let decision = self.registry.with_window(identity, now, |state| {
            state.check_and_record(now, max_requests, window)
        });

        match decision {
            AdmissionDecision::Admitted => self.metrics.record_admitted(),
            AdmissionDecision::Rejected { retry_after } => {
                self.metrics.record_rejected();
                tracing::trace!(?retry_after, "admission rejected");
            }
        }

        // Runs after the identity's stripe has been released
        self.maybe_lazy_sweep(now);

        decision
    }

    /// [`check_and_record`](Self::check_and_record) at the injected clock's
    /// current instant.
    pub fn check_and_record_now<Q>(&self, identity: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        self.check_and_record(identity, self.clock.now())
    }

    /// [`decide`](Self::decide) at the injected clock's current instant.
    pub fn decide_now<Q>(&self, identity: &Q) -> AdmissionDecision
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        self.decide(identity, self.clock.now())
    }

    /// Remove identities that are idle at `now`.
    ///
    /// Returns 0 without touching the store when no retention horizon is
    /// configured.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let Some(retention) = self.config.retention() else {
            return 0;
        };

        let evicted = self
            .registry
            .evict_idle(now, self.config.window(), retention);
        self.metrics.record_sweep(evicted);

        if evicted > 0 {
            tracing::debug!(
                evicted,
                remaining = self.registry.len(),
                "evicted idle identities"
            );
        }

        evicted
    }

    fn maybe_lazy_sweep(&self, now: Instant) {
        let Some(lazy) = &self.lazy_sweep else {
            return;
        };
        let decisions = lazy.decisions.fetch_add(1, Ordering::Relaxed) + 1;
        if decisions % lazy.every == 0 {
            self.evict_idle(now);
        }
    }

    /// Number of timestamps currently retained for `identity`.
    pub fn retained<Q>(&self, identity: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.registry.retained(identity)
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.registry.len()
    }

    /// Get the limiter configuration.
    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Get the injected clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Read-only copy of an identity's window state, if tracked.
    ///
    /// The copy is detached: the registry stays the only owner of the live
    /// state, and `WindowState` exposes no public mutators.
    ///
    /// ```compile_fail
    /// use window_admission::AdmissionEngine;
    /// use std::time::{Duration, Instant};
    ///
    /// let engine = AdmissionEngine::<String>::new(5, Duration::from_secs(60)).unwrap();
    /// let now = Instant::now();
    /// engine.check_and_record("user1", now);
    ///
    /// let mut state = engine.snapshot("user1").unwrap();
    /// state.check_and_record(now, usize::MAX, Duration::from_secs(60));
    /// ```
    pub fn snapshot<Q>(&self, identity: &Q) -> Option<WindowState>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.registry.snapshot(identity)
    }
}

impl<K, S> Clone for AdmissionEngine<K, S>
where
    K: Hash + Eq + Send + Sync,
    S: Storage<K, WindowState> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            config: self.config.clone(),
            clock: Arc::clone(&self.clock),
            metrics: self.metrics.clone(),
            lazy_sweep: self.lazy_sweep.clone(),
        }
    }
}

impl<K, S> fmt::Debug for AdmissionEngine<K, S>
where
    K: Hash + Eq + Send + Sync,
    S: Storage<K, WindowState> + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionEngine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}
