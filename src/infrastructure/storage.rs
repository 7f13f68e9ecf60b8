//! Lock-striped storage for per-identity state.
//!
//! Provides the concurrency guard of the limiter: keys are hashed onto a
//! fixed number of shards, each behind its own read-write lock.

use crate::application::ports::Storage;
use crate::domain::config::{default_shard_count, ConfigError};
use ahash::RandomState;
use dashmap::DashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Thread-safe sharded storage backed by DashMap.
///
/// Every key hashes onto exactly one shard. Mutating access to a key holds
/// that shard's write lock and nothing else, so identities on different
/// shards never contend. Lookups of existing keys never allocate; the key is
/// only cloned into the map on first insertion.
#[derive(Debug)]
pub struct ShardedStorage<K, V>
where
    K: Eq + Hash,
{
    map: DashMap<K, V, RandomState>,
    shard_count: usize,
}

impl<K, V> ShardedStorage<K, V>
where
    K: Eq + Hash,
{
    /// Create a new sharded storage instance with the default striping.
    pub fn new() -> Self {
        let shard_count = default_shard_count();
        Self {
            map: DashMap::with_hasher_and_shard_amount(RandomState::new(), shard_count),
            shard_count,
        }
    }

    /// Create a storage instance striped across `shard_count` locks.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidShardCount`] unless `shard_count` is a
    /// power of two greater than 1.
    pub fn with_shard_count(shard_count: usize) -> Result<Self, ConfigError> {
        if shard_count < 2 || !shard_count.is_power_of_two() {
            return Err(ConfigError::InvalidShardCount(shard_count));
        }
        Ok(Self {
            map: DashMap::with_hasher_and_shard_amount(RandomState::new(), shard_count),
            shard_count,
        })
    }

    /// Number of lock stripes.
    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the storage is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K, V> Default for ShardedStorage<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

// Implement the Storage port
impl<K, V> Storage<K, V> for ShardedStorage<K, V>
where
    K: Hash + Eq + Send + Sync + std::fmt::Debug,
    V: Send + Sync + std::fmt::Debug,
{
    fn with_entry_mut<Q, F, R>(&self, key: &Q, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(&mut V) -> R,
    {
        // Fast path: existing key, no allocation
        if let Some(mut value_ref) = self.map.get_mut(key) {
            return accessor(&mut value_ref);
        }

        // Another thread may have inserted meanwhile; `entry` resolves the race
        let mut value_ref = self.map.entry(key.to_owned()).or_insert_with(factory);
        accessor(&mut value_ref)
    }

    fn with_entry<Q, F, R>(&self, key: &Q, accessor: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.map.get(key).map(|value_ref| accessor(&value_ref))
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn clear(&self) {
        self.map.clear()
    }

    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for entry in self.map.iter() {
            f(entry.key(), entry.value());
        }
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.map.retain(f);
    }
}

// Implement Storage for Arc<ShardedStorage> to allow it to be shared directly
impl<K, V> Storage<K, V> for std::sync::Arc<ShardedStorage<K, V>>
where
    K: Hash + Eq + Send + Sync + std::fmt::Debug,
    V: Send + Sync + std::fmt::Debug,
{
    fn with_entry_mut<Q, F, R>(&self, key: &Q, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(&mut V) -> R,
    {
        (**self).with_entry_mut(key, factory, accessor)
    }

    fn with_entry<Q, F, R>(&self, key: &Q, accessor: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        (**self).with_entry(key, accessor)
    }

    fn len(&self) -> usize {
        Storage::len(&**self)
    }

    fn is_empty(&self) -> bool {
        Storage::is_empty(&**self)
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V),
    {
        (**self).for_each(f)
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        (**self).retain(f)
    }
}
