//! # window-admission
//!
//! Per-identity sliding-window admission control.
//!
//! An [`AdmissionEngine`] bounds how many operations a caller identity may
//! perform within a trailing time window. Each decision prunes the identity's
//! expired timestamps, compares the remainder against the quota and, if there
//! is room, records the new operation. The whole sequence is atomic per
//! identity while unrelated identities proceed in parallel.
//!
//! ## Quick Start
//!
//! ```rust
//! use window_admission::AdmissionEngine;
//! use std::time::{Duration, Instant};
//!
//! let engine = AdmissionEngine::<String>::new(5, Duration::from_secs(60)).unwrap();
//! let now = Instant::now();
//!
//! for _ in 0..5 {
//!     assert!(engine.check_and_record("user1", now));
//! }
//! assert!(!engine.check_and_record("user1", now));
//! ```
//!
//! ## Features
//!
//! ### Admission
//! - **Half-open window**: an operation counts while `now - t < window`; it
//!   stops counting at exactly `window` after it was recorded
//! - **Rejections are free**: a rejected call records nothing
//! - **Explicit time**: `now` is an argument, so decisions are deterministic
//!   under test; `*_now` variants sample the configured [`Clock`]
//!
//! ### Concurrency
//! - **Lock striping**: identities hash to independent shards of a
//!   [`ShardedStorage`]; only one shard lock is held per decision
//! - **Race-free creation**: a first-time identity is created under the same
//!   shard lock as its first decision
//!
//! ### Memory
//! - **Idle eviction**: with a retention horizon configured, identities whose
//!   timestamps have all expired and that have not been seen for the horizon
//!   are dropped by [`AdmissionEngine::evict_idle`]. Sweeps can also run
//!   lazily every N decisions or from a background task (feature `async`)
//!
//! ### Observability
//! - **Metrics**: decision and eviction counters via [`Metrics`]
//! - **Logging**: `tracing` events for rejections and sweeps; no subscriber is
//!   installed by the library
//!
//! ## Configuration
//!
//! ```rust
//! use window_admission::AdmissionEngine;
//! use std::time::Duration;
//!
//! let engine = AdmissionEngine::<u64>::builder(100, Duration::from_secs(1))
//!     .with_shard_count(128)
//!     .with_retention(Duration::from_secs(300))
//!     .with_lazy_sweep_every(50_000)
//!     .build()
//!     .expect("valid configuration");
//! # let _ = engine;
//! ```
//!
//! Invalid values are reported as [`ConfigError`], never clamped.

#![forbid(unsafe_code)]

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    limiter::AdmissionEngine,
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, Storage},
    registry::WindowRegistry,
};
pub use domain::{
    config::{ConfigError, LimiterConfig},
    decision::AdmissionDecision,
    window::WindowState,
};
pub use infrastructure::{builder::AdmissionEngineBuilder, clock::SystemClock, storage::ShardedStorage};

#[cfg(feature = "async")]
pub use application::sweeper::{IdleSweeper, ShutdownError, SweeperConfigError, SweeperHandle};

#[cfg(feature = "test-helpers")]
pub use infrastructure::mocks::MockClock;
