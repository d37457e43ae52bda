//! # TinyLFU-Admitted LRU (single shard)
//!
//! Composes the [`LruCore`] with a [`CountMinSketch`]: recency decides *who
//! leaves*, approximate frequency decides *who gets in*.
//!
//! ## Admission Flow
//!
//! ```text
//!   insert(key, value)
//!        │
//!        ▼  sketch.observe(key)            (every get and insert counts,
//!        │                                  whatever the admission outcome)
//!        ▼
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │ key resident?         → update value, promote to MRU              │
//!   │ below capacity?       → insert at MRU                             │
//!   │ otherwise:                                                        │
//!   │     victim = peek_lru()                                           │
//!   │     estimate(key) ≥ estimate(victim) → evict victim, insert key   │
//!   │     estimate(key) < estimate(victim) → decline, LRU untouched     │
//!   └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A tie admits the newcomer. Without that rule the cache could never cold
//! start on a fresh key space: every first-time key would lose to a victim
//! with an equal estimate.
//!
//! A declined insert drops the incoming value and returns `None`; this is an
//! expected outcome, not an error.
//!
//! [`decay`](TinyLfuCache::decay) halves the sketch and leaves residency
//! untouched. The caller owns the decay schedule.

use std::hash::Hash;

use crate::ds::CountMinSketch;
use crate::error::ConfigError;
use crate::metrics::{TinyLfuMetrics, TinyLfuMetricsSnapshot};
use crate::policy::lru::LruCore;
use crate::traits::{AdmissionCache, CoreCache, LruCacheTrait, MutableCache};

/// Default sketch width when the caller has no opinion.
pub const DEFAULT_SKETCH_WIDTH: usize = 4096;
/// Default sketch depth when the caller has no opinion.
pub const DEFAULT_SKETCH_DEPTH: usize = 4;

/// LRU cache with a TinyLFU admission filter in front of it.
///
/// Not thread-safe; [`ShardedCache`](crate::sharded::ShardedCache) wraps one
/// per shard behind that shard's lock.
///
/// # Example
///
/// ```
/// use admitkit::policy::tiny_lfu::TinyLfuCache;
/// use admitkit::traits::CoreCache;
///
/// let mut cache: TinyLfuCache<u32, &str> = TinyLfuCache::new(2, 1024, 4);
///
/// // Make keys 1 and 2 hot, then offer a one-shot key.
/// for _ in 0..5 {
///     cache.insert(1, "a");
///     cache.insert(2, "b");
/// }
/// cache.insert(3, "c");
///
/// // The one-shot key lost the admission comparison.
/// assert!(!cache.contains(&3));
/// assert!(cache.contains(&1));
/// assert!(cache.contains(&2));
/// ```
pub struct TinyLfuCache<K, V>
where
    K: Copy + Eq + Hash,
{
    lru: LruCore<K, V>,
    sketch: CountMinSketch,
    metrics: TinyLfuMetrics,
}

impl<K, V> TinyLfuCache<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Creates a TinyLFU-admitted LRU cache.
    ///
    /// `capacity` must be non-zero, `cms_width` a non-zero power of two, and
    /// `cms_depth` in `1..=8`.
    pub fn try_new(
        capacity: usize,
        cms_width: usize,
        cms_depth: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            lru: LruCore::try_new(capacity)?,
            sketch: CountMinSketch::try_new(cms_width, cms_depth)?,
            metrics: TinyLfuMetrics::default(),
        })
    }

    /// Creates a TinyLFU-admitted LRU cache, panicking on an invalid
    /// configuration.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions [`try_new`](Self::try_new) errors.
    pub fn new(capacity: usize, cms_width: usize, cms_depth: usize) -> Self {
        match Self::try_new(capacity, cms_width, cms_depth) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Read-only lookup: no sketch update, no promotion.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.lru.peek(key)
    }

    /// Returns a copy of this cache's operation counters.
    pub fn metrics_snapshot(&self) -> TinyLfuMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<K, V> CoreCache<K, V> for TinyLfuCache<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Insert through the admission filter.
    ///
    /// Returns the previous value on update, `None` on fill, admission, or
    /// decline.
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.sketch.observe(&key);

        if self.lru.contains(&key) {
            self.metrics.record_update();
            return self.lru.insert(key, value);
        }

        if self.lru.len() < self.lru.capacity() {
            self.metrics.record_fill();
            return self.lru.insert(key, value);
        }

        // Full cache always has a victim; capacity 0 is rejected at
        // construction.
        let Some(victim) = self.lru.peek_lru().map(|(k, _)| *k) else {
            self.metrics.record_fill();
            return self.lru.insert(key, value);
        };

        if self.sketch.estimate(&key) >= self.sketch.estimate(&victim) {
            self.metrics.record_admitted();
            self.lru.remove(&victim);
            self.lru.insert(key, value)
        } else {
            self.metrics.record_rejected();
            None
        }
    }

    /// Lookup that counts in the sketch whether it hits or misses.
    fn get(&mut self, key: &K) -> Option<&V> {
        self.sketch.observe(key);
        let result = self.lru.get(key);
        self.metrics.record_get(result.is_some());
        result
    }

    fn contains(&self, key: &K) -> bool {
        self.lru.contains(key)
    }

    fn len(&self) -> usize {
        self.lru.len()
    }

    fn capacity(&self) -> usize {
        self.lru.capacity()
    }

    fn clear(&mut self) {
        self.lru.clear();
    }
}

impl<K, V> MutableCache<K, V> for TinyLfuCache<K, V>
where
    K: Copy + Eq + Hash,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        self.lru.remove(key)
    }
}

impl<K, V> AdmissionCache<K, V> for TinyLfuCache<K, V>
where
    K: Copy + Eq + Hash,
{
    fn estimate(&self, key: &K) -> u32 {
        self.sketch.estimate(key)
    }

    /// Halve the sketch. Resident entries are unaffected.
    fn decay(&mut self) {
        self.sketch.decay_half();
        self.metrics.record_decay();
    }
}

impl<K, V> std::fmt::Debug for TinyLfuCache<K, V>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TinyLfuCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("sketch_width", &self.sketch.width())
            .field("sketch_depth", &self.sketch.depth())
            .finish_non_exhaustive()
    }
}
