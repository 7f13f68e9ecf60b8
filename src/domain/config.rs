//! Validated limiter configuration.
//!
//! Every value is checked once, at construction. Nothing is clamped: an
//! invalid value is surfaced to the caller as a [`ConfigError`].

use std::time::Duration;

/// Error returned when a limiter configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The admission quota must allow at least one request per window
    #[error("max_requests must be greater than 0")]
    ZeroMaxRequests,
    /// The trailing window must have a non-zero length
    #[error("window must be greater than 0")]
    ZeroWindow,
    /// Lock striping needs a power-of-two shard count of at least 2
    #[error("shard count must be a power of two greater than 1, got {0}")]
    InvalidShardCount(usize),
    /// Idle retention horizon must be greater than zero when set
    #[error("retention must be greater than 0")]
    ZeroRetention,
    /// Lazy sweeping must run at least every `n >= 1` decisions
    #[error("lazy sweep cadence must be greater than 0")]
    ZeroLazySweep,
    /// Lazy sweeping evicts nothing unless a retention horizon is set
    #[error("lazy sweep requires a retention horizon")]
    LazySweepWithoutRetention,
}

/// Immutable configuration for an admission engine.
///
/// # Example
/// ```
/// use window_admission::LimiterConfig;
/// use std::time::Duration;
///
/// let config = LimiterConfig::new(5, Duration::from_secs(60))
///     .unwrap()
///     .with_retention(Duration::from_secs(600))
///     .unwrap();
///
/// assert_eq!(config.max_requests(), 5);
/// assert_eq!(config.retention(), Some(Duration::from_secs(600)));
///
/// assert!(LimiterConfig::new(0, Duration::from_secs(60)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimiterConfig {
    max_requests: usize,
    window: Duration,
    shard_count: usize,
    retention: Option<Duration>,
}

impl LimiterConfig {
    /// Create a configuration admitting `max_requests` per trailing `window`.
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroMaxRequests`] or [`ConfigError::ZeroWindow`]
    /// if either value is zero.
    pub fn new(max_requests: usize, window: Duration) -> Result<Self, ConfigError> {
        if max_requests == 0 {
            return Err(ConfigError::ZeroMaxRequests);
        }
        if window.is_zero() {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(Self {
            max_requests,
            window,
            shard_count: default_shard_count(),
            retention: None,
        })
    }

    /// Set the number of lock stripes.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidShardCount`] unless `shard_count` is a
    /// power of two greater than 1.
    pub fn with_shard_count(mut self, shard_count: usize) -> Result<Self, ConfigError> {
        if shard_count < 2 || !shard_count.is_power_of_two() {
            return Err(ConfigError::InvalidShardCount(shard_count));
        }
        self.shard_count = shard_count;
        Ok(self)
    }

    /// Enable idle eviction with the given retention horizon.
    ///
    /// An identity becomes evictable once none of its entries lie inside the
    /// window and it has not been seen for at least `retention`.
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroRetention`] if `retention` is zero.
    pub fn with_retention(mut self, retention: Duration) -> Result<Self, ConfigError> {
        if retention.is_zero() {
            return Err(ConfigError::ZeroRetention);
        }
        self.retention = Some(retention);
        Ok(self)
    }

    /// Admission quota per window.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Length of the trailing window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of lock stripes in the state store.
    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    /// Idle retention horizon, `None` when eviction is disabled.
    pub fn retention(&self) -> Option<Duration> {
        self.retention
    }
}

/// Four stripes per available core, rounded up to a power of two.
pub(crate) fn default_shard_count() -> usize {
    let cores = std::thread::available_parallelism().map_or(1, usize::from);
    (cores * 4).next_power_of_two().max(2)
}
