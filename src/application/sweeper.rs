//! Background idle eviction.
//!
//! Periodically removes identities whose window state has gone idle, keeping
//! memory bounded for workloads with many short-lived callers.

use crate::application::limiter::AdmissionEngine;
use crate::application::ports::Storage;
use crate::domain::window::WindowState;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Error returned when sweeper configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SweeperConfigError {
    /// Sweep interval must be greater than zero
    #[error("sweep interval must be greater than 0")]
    ZeroInterval,
}

/// Error returned when stopping the sweeper task fails.
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    /// The sweeper task panicked
    #[error("idle sweeper task panicked")]
    TaskPanicked,
    /// The sweeper task was cancelled from outside
    #[error("idle sweeper task was cancelled")]
    TaskCancelled,
}

/// Periodic idle sweep over an engine's state store.
///
/// Each tick samples the engine's clock and calls
/// [`AdmissionEngine::evict_idle`]. Requires the `async` feature and a
/// running tokio runtime.
pub struct IdleSweeper<K, S>
where
    K: Hash + Eq + Send + Sync,
    S: Storage<K, WindowState> + Clone,
{
    engine: AdmissionEngine<K, S>,
    interval: Duration,
}

impl<K, S> IdleSweeper<K, S>
where
    K: Hash + Eq + Send + Sync + 'static,
    S: Storage<K, WindowState> + Clone + 'static,
{
    /// Create a sweeper for `engine` running every `interval`.
    ///
    /// # Errors
    /// Returns `SweeperConfigError::ZeroInterval` if `interval` is zero.
    pub fn new(
        engine: AdmissionEngine<K, S>,
        interval: Duration,
    ) -> Result<Self, SweeperConfigError> {
        if interval.is_zero() {
            return Err(SweeperConfigError::ZeroInterval);
        }
        Ok(Self { engine, interval })
    }

    /// Spawn the sweep loop on the current tokio runtime.
    ///
    /// The task runs until [`SweeperHandle::shutdown`] is called or the
    /// handle is dropped.
    pub fn start(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let now = self.engine.clock().now();
                        self.engine.evict_idle(now);
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("idle sweeper stopped");
                        break;
                    }
                }
            }
        });

        SweeperHandle {
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }
}

/// Handle to a running [`IdleSweeper`] task.
///
/// Dropping the handle also stops the task, at its next scheduling point.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Check if the sweep loop is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the sweep loop and wait for it to exit.
    ///
    /// # Errors
    /// Returns `ShutdownError` if the task panicked or was aborted.
    pub async fn shutdown(mut self) -> Result<(), ShutdownError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The task may already have exited; its join result reports why
            let _ = tx.send(());
        }

        match (&mut self.task).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_panic() => {
                tracing::warn!("idle sweeper task panicked");
                Err(ShutdownError::TaskPanicked)
            }
            Err(_) => Err(ShutdownError::TaskCancelled),
        }
    }
}

impl<K, S> AdmissionEngine<K, S>
where
    K: Hash + Eq + Send + Sync + 'static,
    S: Storage<K, WindowState> + Clone + 'static,
{
    /// Start a background idle sweep sharing this engine's state.
    ///
    /// # Errors
    /// Returns `SweeperConfigError::ZeroInterval` if `interval` is zero.
    pub fn spawn_sweeper(&self, interval: Duration) -> Result<SweeperHandle, SweeperConfigError> {
        Ok(IdleSweeper::new(self.clone(), interval)?.start())
    }
}
