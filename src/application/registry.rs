//! State store mapping caller identities to their window state.
//!
//! The registry exclusively owns every [`WindowState`]. Callers only ever see
//! a state through a closure running inside that identity's critical section.

use crate::application::ports::Storage;
use crate::domain::window::WindowState;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

/// Registry managing all per-identity window state.
///
/// Uses the Storage port for concurrent access.
///
/// This type is generic over the storage implementation, allowing different
/// storage backends to be used. In production, use `Arc<ShardedStorage>`.
pub struct WindowRegistry<K, S>
where
    K: Hash + Eq + Send + Sync,
    S: Storage<K, WindowState> + Clone,
{
    storage: S,
    _identity: PhantomData<fn() -> K>,
}

impl<K, S> WindowRegistry<K, S>
where
    K: Hash + Eq + Send + Sync,
    S: Storage<K, WindowState> + Clone,
{
    /// Create a new registry over the given storage.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            _identity: PhantomData,
        }
    }

    /// Run `f` on the identity's window state, creating it if necessary.
    ///
    /// `f` executes while the identity is exclusively held: no other call for
    /// the same identity can observe or modify the state until it returns.
    pub(crate) fn with_window<Q, F, R>(&self, identity: &Q, now: Instant, f: F) -> R
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(&mut WindowState) -> R,
    {
        self.storage
            .with_entry_mut(identity, || WindowState::new(now), f)
    }

    /// Number of retained timestamps for an identity, 0 if untracked.
    pub fn retained<Q>(&self, identity: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.storage
            .with_entry(identity, WindowState::len)
            .unwrap_or(0)
    }

    /// Copy of an identity's current state, if tracked.
    pub fn snapshot<Q>(&self, identity: &Q) -> Option<WindowState>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.storage.with_entry(identity, WindowState::clone)
    }

    /// Remove every identity whose state is idle at `now`.
    ///
    /// Only states with no entry left inside `window` are removed, so the
    /// next access recreates a state that decides exactly as the removed one
    /// would have.
    ///
    /// # Returns
    /// The number of identities removed
    pub fn evict_idle(&self, now: Instant, window: Duration, retention: Duration) -> usize {
        let mut evicted = 0;
        self.storage.retain(|_, state| {
            if state.is_idle(now, window, retention) {
                evicted += 1;
                false
            } else {
                true
            }
        });
        evicted
    }

    /// Get the number of tracked identities.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Clear all tracked state.
    pub fn clear(&self) {
        self.storage.clear();
    }

    /// Iterate over all tracked identities with a callback.
    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &WindowState),
    {
        self.storage.for_each(f);
    }
}

impl<K, S> Clone for WindowRegistry<K, S>
where
    K: Hash + Eq + Send + Sync,
    S: Storage<K, WindowState> + Clone,
{
    fn clone(&self) -> Self {
        Self::new(self.storage.clone())
    }
}

impl<K, S> fmt::Debug for WindowRegistry<K, S>
where
    K: Hash + Eq + Send + Sync,
    S: Storage<K, WindowState> + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowRegistry")
            .field("identities", &self.len())
            .finish()
    }
}
