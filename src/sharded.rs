//! # Sharded Cache Composition
//!
//! A fixed array of single-shard caches with one `parking_lot::Mutex` per
//! shard. Thread-safe `&self` methods route every operation to exactly one
//! shard; there is no global lock.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                     ShardedCache<K, W, S>                        │
//!   │                                                                  │
//!   │   key ──► ShardSelector ──► shard index i                        │
//!   │                                  │                               │
//!   │   ┌───────────┬───────────┬─────▼─────┬───────────┐              │
//!   │   │ Mutex<S>  │ Mutex<S>  │ Mutex<S>  │ Mutex<S>  │              │
//!   │   │ shard 0   │ shard 1   │ shard 2   │ shard 3   │              │
//!   │   └───────────┴───────────┴───────────┴───────────┘              │
//!   │                                                                  │
//!   │   capacity split: base = total / n to every shard,               │
//!   │                   remainder to the last shard                    │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking Discipline
//!
//! - An operation acquires at most one shard lock, held only for the duration
//!   of that operation.
//! - [`len`](ShardedCache::len), [`clear`](ShardedCache::clear), and
//!   [`decay`](ShardedCache::decay) visit shards sequentially, one lock at a
//!   time, never two simultaneously. `len` therefore returns a snapshot that
//!   may lag concurrent mutations; callers needing an exact count must
//!   serialize externally.
//! - Per-key operations on the same shard are linearizable in lock
//!   acquisition order. There is no cross-shard ordering.
//!
//! ## Concrete Types
//!
//! | Alias                 | Shard type                    | Policy              |
//! |-----------------------|-------------------------------|---------------------|
//! | [`ShardedLru<K, V>`]  | `LruCore<K, Arc<V>>`          | plain LRU           |
//! | [`ShardedTinyLfu<K, V>`] | `TinyLfuCache<K, Arc<V>>`  | LRU + admission     |
//!
//! Values are stored as `Arc<V>` so lookups can hand out a clone of the
//! pointer without holding the shard lock.

use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::ds::{shard_capacities, ShardSelector};
use crate::error::ConfigError;
use crate::metrics::TinyLfuMetricsSnapshot;
use crate::policy::lru::LruCore;
use crate::policy::tiny_lfu::TinyLfuCache;
use crate::traits::{AdmissionCache, ConcurrentCache, CoreCache, MutableCache};

/// Thread-safe cache composed of independently locked single-shard caches.
///
/// `W` is the stored entry type (clonable, typically `Arc<V>`), `S` the
/// single-shard cache. A key's shard is a pure function of the key, so every
/// call site routes a given key to the same shard.
pub struct ShardedCache<K, W, S>
where
    K: Copy + Eq + Hash,
    S: CoreCache<K, W>,
{
    shards: Box<[Mutex<S>]>,
    selector: ShardSelector,
    capacity: usize,
    _marker: PhantomData<fn(K) -> W>,
}

/// Sharded plain-LRU cache.
pub type ShardedLru<K, V> = ShardedCache<K, Arc<V>, LruCore<K, Arc<V>>>;

/// Sharded TinyLFU-admitted LRU cache.
pub type ShardedTinyLfu<K, V> = ShardedCache<K, Arc<V>, TinyLfuCache<K, Arc<V>>>;

impl<K, W, S> ShardedCache<K, W, S>
where
    K: Copy + Eq + Hash,
    S: CoreCache<K, W>,
{
    fn build(
        capacity: usize,
        shards: usize,
        make_shard: impl Fn(usize) -> Result<S, ConfigError>,
    ) -> Result<Self, ConfigError> {
        if shards == 0 {
            return Err(ConfigError::new("shards must be > 0"));
        }
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        if capacity < shards {
            return Err(ConfigError::new(format!(
                "capacity {capacity} cannot be split across {shards} shards; \
                 every shard needs at least one entry"
            )));
        }

        let built: Result<Vec<_>, ConfigError> = shard_capacities(capacity, shards)
            .into_iter()
            .map(|cap| make_shard(cap).map(Mutex::new))
            .collect();

        Ok(Self {
            shards: built?.into_boxed_slice(),
            selector: ShardSelector::new(shards, 0),
            capacity,
            _marker: PhantomData,
        })
    }

    pub(crate) fn selector(&self) -> ShardSelector {
        self.selector.clone()
    }

    #[inline]
    fn shard_for(&self, key: &K) -> &Mutex<S> {
        &self.shards[self.selector.shard_for_key(key)]
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the total configured capacity, as partitioned across shards.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, W, S> ShardedCache<K, W, S>
where
    K: Copy + Eq + Hash,
    W: Clone,
    S: MutableCache<K, W>,
{
    /// Looks up a key on its shard, promoting it per the shard's policy.
    ///
    /// Returns a clone of the stored entry (an `Arc` clone for the provided
    /// aliases).
    pub fn get(&self, key: &K) -> Option<W> {
        let mut shard = self.shard_for(key).lock();
        shard.get(key).cloned()
    }

    /// Inserts on the key's shard, subject to the shard's policy.
    ///
    /// Returns the previous entry on update; `None` on a fresh insert or when
    /// an admission filter declines.
    pub fn insert(&self, key: K, value: W) -> Option<W> {
        self.shard_for(&key).lock().insert(key, value)
    }

    /// Removes a key from its shard.
    pub fn remove(&self, key: &K) -> Option<W> {
        self.shard_for(key).lock().remove(key)
    }

    /// Checks residency without touching the shard's eviction order.
    pub fn contains(&self, key: &K) -> bool {
        self.shard_for(key).lock().contains(key)
    }

    /// Sums per-shard sizes, locking shards sequentially.
    ///
    /// The result is a snapshot: correct for some interleaving of the
    /// per-shard reads, not necessarily for any single instant.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    /// Returns `true` if no shard currently holds an entry (snapshot
    /// semantics, like [`len`](Self::len)).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-shard entry counts, in shard-index order.
    pub fn shard_lens(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| shard.lock().len()).collect()
    }

    /// Clears every shard, one lock at a time.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.lock().clear();
        }
    }
}

impl<K, W, S> ShardedCache<K, W, S>
where
    K: Copy + Eq + Hash,
    W: Clone,
    S: AdmissionCache<K, W>,
{
    /// Halves every shard's frequency sketch, one lock at a time.
    pub fn decay(&self) {
        for shard in self.shards.iter() {
            shard.lock().decay();
        }
    }

    /// Returns the approximate observation count for a key on its shard.
    pub fn estimate(&self, key: &K) -> u32 {
        self.shard_for(key).lock().estimate(key)
    }
}

impl<K, W> ShardedCache<K, W, LruCore<K, W>>
where
    K: Copy + Eq + Hash,
{
    /// Creates a sharded LRU cache with `capacity` entries split across
    /// `shards` partitions.
    ///
    /// Fails when `shards` is 0, `capacity` is 0, or the split would leave a
    /// shard with no entries.
    pub fn try_new(capacity: usize, shards: usize) -> Result<Self, ConfigError> {
        Self::build(capacity, shards, LruCore::try_new)
    }

    /// Creates a sharded LRU cache, panicking on an invalid configuration.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions [`try_new`](Self::try_new) errors.
    pub fn new(capacity: usize, shards: usize) -> Self {
        match Self::try_new(capacity, shards) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K, W> ShardedCache<K, W, TinyLfuCache<K, W>>
where
    K: Copy + Eq + Hash,
{
    /// Creates a sharded TinyLFU cache with `capacity` entries split across
    /// `shards` partitions and one `cms_width` x `cms_depth` sketch per
    /// shard.
    pub fn try_new(
        capacity: usize,
        shards: usize,
        cms_width: usize,
        cms_depth: usize,
    ) -> Result<Self, ConfigError> {
        Self::build(capacity, shards, |cap| {
            TinyLfuCache::try_new(cap, cms_width, cms_depth)
        })
    }

    /// Creates a sharded TinyLFU cache, panicking on an invalid
    /// configuration.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions [`try_new`](Self::try_new) errors.
    pub fn new(capacity: usize, shards: usize, cms_width: usize, cms_depth: usize) -> Self {
        match Self::try_new(capacity, shards, cms_width, cms_depth) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Sums the per-shard operation counters, one lock at a time.
    pub fn metrics_snapshot(&self) -> TinyLfuMetricsSnapshot {
        self.shards
            .iter()
            .fold(TinyLfuMetricsSnapshot::default(), |acc, shard| {
                acc.combine(&shard.lock().metrics_snapshot())
            })
    }
}

impl<K, V> ShardedCache<K, Arc<V>, LruCore<K, Arc<V>>>
where
    K: Copy + Eq + Hash,
{
    /// Inserts a plain value, wrapping it in `Arc` internally.
    pub fn insert_value(&self, key: K, value: V) -> Option<Arc<V>> {
        self.insert(key, Arc::new(value))
    }
}

impl<K, V> ShardedCache<K, Arc<V>, TinyLfuCache<K, Arc<V>>>
where
    K: Copy + Eq + Hash,
{
    /// Inserts a plain value, wrapping it in `Arc` internally.
    pub fn insert_value(&self, key: K, value: V) -> Option<Arc<V>> {
        self.insert(key, Arc::new(value))
    }
}

impl<K, W, S> ConcurrentCache for ShardedCache<K, W, S>
where
    K: Copy + Eq + Hash,
    S: CoreCache<K, W> + Send,
{
}

impl<K, W, S> std::fmt::Debug for ShardedCache<K, W, S>
where
    K: Copy + Eq + Hash,
    S: CoreCache<K, W>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedCache")
            .field("shards", &self.shards.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
