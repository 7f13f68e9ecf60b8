//! Construction of production engines.
//!
//! Wires the validated configuration, the lock-striped storage and the
//! system clock into an [`AdmissionEngine`].

use crate::application::{limiter::AdmissionEngine, ports::Clock, registry::WindowRegistry};
use crate::domain::config::{ConfigError, LimiterConfig};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::storage::ShardedStorage;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Builder for constructing an [`AdmissionEngine`].
///
/// # Example
/// ```
/// use window_admission::AdmissionEngine;
/// use std::time::Duration;
///
/// let engine = AdmissionEngine::<u64>::builder(100, Duration::from_secs(60))
///     .with_shard_count(64)
///     .with_retention(Duration::from_secs(600))
///     .with_lazy_sweep_every(10_000)
///     .build()
///     .unwrap();
///
/// assert_eq!(engine.config().shard_count(), 64);
/// ```
pub struct AdmissionEngineBuilder<K> {
    max_requests: usize,
    window: Duration,
    shard_count: Option<usize>,
    retention: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
    lazy_sweep_every: Option<u64>,
    _identity: PhantomData<fn() -> K>,
}

impl<K> AdmissionEngineBuilder<K>
where
    K: Hash + Eq + Send + Sync + std::fmt::Debug,
{
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            shard_count: None,
            retention: None,
            clock: None,
            lazy_sweep_every: None,
            _identity: PhantomData,
        }
    }

    /// Set the number of lock stripes (power of two, at least 2).
    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = Some(shard_count);
        self
    }

    /// Enable idle eviction with the given retention horizon.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }

    /// Set a custom clock for the `*_now` entry points and the sweeper.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Run an idle sweep inline every `decisions` decisions.
    ///
    /// Requires [`with_retention`](Self::with_retention); `build()` rejects
    /// a lazy sweep without a retention horizon.
    pub fn with_lazy_sweep_every(mut self, decisions: u64) -> Self {
        self.lazy_sweep_every = Some(decisions);
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    /// Returns `ConfigError` if any configured value is invalid, or
    /// `ConfigError::LazySweepWithoutRetention` if a lazy sweep cadence is
    /// set while idle eviction is disabled.
    pub fn build(self) -> Result<AdmissionEngine<K>, ConfigError> {
        let mut config = LimiterConfig::new(self.max_requests, self.window)?;
        if let Some(shard_count) = self.shard_count {
            config = config.with_shard_count(shard_count)?;
        }
        if let Some(retention) = self.retention {
            config = config.with_retention(retention)?;
        }
        match self.lazy_sweep_every {
            Some(0) => return Err(ConfigError::ZeroLazySweep),
            Some(_) if config.retention().is_none() => {
                return Err(ConfigError::LazySweepWithoutRetention)
            }
            _ => {}
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let engine = AdmissionEngine::with_config_and_clock(config, clock)?;

        Ok(match self.lazy_sweep_every {
            Some(every) => engine.with_lazy_sweep(every),
            None => engine,
        })
    }
}

impl<K> AdmissionEngine<K>
where
    K: Hash + Eq + Send + Sync + std::fmt::Debug,
{
    /// Create an engine admitting `max_requests` per identity per trailing
    /// `window`, using the system clock and default lock striping.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroMaxRequests` or `ConfigError::ZeroWindow`.
    pub fn new(max_requests: usize, window: Duration) -> Result<Self, ConfigError> {
        Self::with_config(LimiterConfig::new(max_requests, window)?)
    }

    /// Create an engine from a validated configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidShardCount` if the storage cannot be
    /// striped as configured.
    pub fn with_config(config: LimiterConfig) -> Result<Self, ConfigError> {
        Self::with_config_and_clock(config, Arc::new(SystemClock::new()))
    }

    /// Create an engine from a validated configuration and a custom clock.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidShardCount` if the storage cannot be
    /// striped as configured.
    pub fn with_config_and_clock(
        config: LimiterConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let storage = Arc::new(ShardedStorage::with_shard_count(config.shard_count())?);
        let registry = WindowRegistry::new(storage);
        Ok(Self::from_parts(registry, config, clock))
    }

    /// Start building an engine with the two required limits.
    pub fn builder(max_requests: usize, window: Duration) -> AdmissionEngineBuilder<K> {
        AdmissionEngineBuilder::new(max_requests, window)
    }
}
