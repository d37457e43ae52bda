//! # Least Frequently Used (LFU) Reference Cache
//!
//! Exact LFU with per-frequency buckets and a tracked minimum frequency.
//! Serves as the hit-rate baseline the approximate
//! [`TinyLfuCache`](crate::policy::tiny_lfu::TinyLfuCache) is measured
//! against in the benchmarks.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                         LfuCache<K, V>                           │
//!   │                                                                  │
//!   │   entries: FxHashMap<K, { value, freq, slot }>                   │
//!   │                                                                  │
//!   │   buckets: freq ──► [ keys with that frequency ]                 │
//!   │                                                                  │
//!   │      1 ──► [ d ]            ◄── min_freq (eviction bucket)       │
//!   │      2 ──► [ b, c ]                                              │
//!   │      5 ──► [ a ]                                                 │
//!   │                                                                  │
//!   │   get/insert bump a key from bucket f to bucket f+1              │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tie-breaking inside a bucket is arbitrary (`swap_remove` order), which is
//! acceptable for a reference cache; callers must not rely on which
//! same-frequency entry is evicted first.
//!
//! No aging is applied here: frequencies only grow. That is the
//! cache-pollution weakness the TinyLFU sketch-plus-decay design addresses.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::traits::{CoreCache, LfuCacheTrait, MutableCache};

struct Entry<V> {
    value: V,
    freq: u64,
    /// Position of the key inside its frequency bucket.
    slot: usize,
}

/// Exact LFU cache with O(1) get, insert, remove, and eviction.
///
/// Not thread-safe; wrap in [`ShardedCache`](crate::sharded::ShardedCache)
/// or an external lock for shared access.
///
/// # Example
///
/// ```
/// use admitkit::policy::lfu::LfuCache;
/// use admitkit::traits::{CoreCache, LfuCacheTrait};
///
/// let mut cache: LfuCache<u32, &str> = LfuCache::new(2);
/// cache.insert(1, "a");
/// cache.insert(2, "b");
/// cache.get(&1);
///
/// // key 2 has the lower frequency, so it is the eviction victim
/// cache.insert(3, "c");
/// assert!(cache.contains(&1));
/// assert!(!cache.contains(&2));
/// ```
pub struct LfuCache<K, V>
where
    K: Copy + Eq + Hash,
{
    entries: FxHashMap<K, Entry<V>>,
    buckets: FxHashMap<u64, Vec<K>>,
    min_freq: u64,
    capacity: usize,
}

impl<K, V> LfuCache<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Creates an LFU cache with the given capacity.
    ///
    /// Capacity 0 is rejected.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        Ok(Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
            capacity,
        })
    }

    /// Creates an LFU cache, panicking on an invalid capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. Use [`try_new`](Self::try_new) to handle
    /// the error instead.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Remove `key` from the bucket for `freq` at position `slot`, patching
    /// the slot of whichever key `swap_remove` moved into its place.
    fn remove_from_bucket(&mut self, freq: u64, slot: usize) {
        let bucket = self
            .buckets
            .get_mut(&freq)
            .expect("bucket exists for every entry frequency");
        bucket.swap_remove(slot);
        if let Some(&moved) = bucket.get(slot) {
            if let Some(entry) = self.entries.get_mut(&moved) {
                entry.slot = slot;
            }
        }
        if bucket.is_empty() {
            self.buckets.remove(&freq);
        }
    }

    /// Move a resident key from its bucket to the next-higher one.
    fn bump(&mut self, key: &K) {
        let (freq, slot) = match self.entries.get(key) {
            Some(entry) => (entry.freq, entry.slot),
            None => return,
        };

        self.remove_from_bucket(freq, slot);
        if self.min_freq == freq && !self.buckets.contains_key(&freq) {
            // The bumped key itself now populates bucket freq + 1.
            self.min_freq = freq + 1;
        }

        let bucket = self.buckets.entry(freq + 1).or_default();
        bucket.push(*key);
        let new_slot = bucket.len() - 1;
        if let Some(entry) = self.entries.get_mut(key) {
            entry.freq = freq + 1;
            entry.slot = new_slot;
        }
    }

    fn recompute_min_freq(&mut self) {
        self.min_freq = self.buckets.keys().copied().min().unwrap_or(0);
    }

    fn evict_one(&mut self) -> Option<(K, V)> {
        let min_freq = self.min_freq;
        let bucket = self.buckets.get_mut(&min_freq)?;
        let victim = bucket.pop()?;
        if bucket.is_empty() {
            self.buckets.remove(&min_freq);
        }
        let entry = self.entries.remove(&victim)?;
        Some((victim, entry.value))
    }
}

impl<K, V> CoreCache<K, V> for LfuCache<K, V>
where
    K: Copy + Eq + Hash,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(entry) = self.entries.get_mut(&key) {
            let previous = std::mem::replace(&mut entry.value, value);
            self.bump(&key);
            return Some(previous);
        }

        if self.entries.len() >= self.capacity {
            self.evict_one();
        }

        let bucket = self.buckets.entry(1).or_default();
        bucket.push(key);
        let slot = bucket.len() - 1;
        self.entries.insert(
            key,
            Entry {
                value,
                freq: 1,
                slot,
            },
        );
        self.min_freq = 1;
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.bump(key);
        self.entries.get(key).map(|entry| &entry.value)
    }

    fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }
}

impl<K, V> MutableCache<K, V> for LfuCache<K, V>
where
    K: Copy + Eq + Hash,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        let entry = self.entries.remove(key)?;
        self.remove_from_bucket(entry.freq, entry.slot);
        if entry.freq == self.min_freq && !self.buckets.contains_key(&entry.freq) {
            self.recompute_min_freq();
        }
        Some(entry.value)
    }
}

impl<K, V> LfuCacheTrait<K, V> for LfuCache<K, V>
where
    K: Copy + Eq + Hash,
{
    fn pop_lfu(&mut self) -> Option<(K, V)> {
        let popped = self.evict_one()?;
        if !self.buckets.contains_key(&self.min_freq) {
            self.recompute_min_freq();
        }
        Some(popped)
    }

    fn peek_lfu(&self) -> Option<(&K, &V)> {
        let bucket = self.buckets.get(&self.min_freq)?;
        let key = bucket.last()?;
        let entry = self.entries.get(key)?;
        Some((key, &entry.value))
    }

    fn frequency(&self, key: &K) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.freq)
    }
}

impl<K, V> std::fmt::Debug for LfuCache<K, V>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LfuCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("min_freq", &self.min_freq)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(LfuCache::<u32, u32>::try_new(0).is_err());
    }

    #[test]
    fn insert_get_roundtrip() {
        let mut cache = LfuCache::new(4);

        assert_eq!(cache.insert(1, "one"), None);
        assert_eq!(cache.get(&1), Some(&"one"));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.frequency(&1), Some(2));
    }

    #[test]
    fn update_preserves_entry_count_and_bumps() {
        let mut cache = LfuCache::new(4);

        cache.insert(1, "one");
        assert_eq!(cache.insert(1, "ONE"), Some("one"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.frequency(&1), Some(2));
        assert_eq!(cache.get(&1), Some(&"ONE"));
    }

    #[test]
    fn evicts_least_frequent() {
        let mut cache = LfuCache::new(2);

        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.get(&1);
        cache.get(&1);

        cache.insert(3, 30);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn frequency_tie_evicts_some_cold_entry() {
        let mut cache = LfuCache::new(2);

        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.insert(3, 30);

        // Both 1 and 2 had frequency 1; exactly one survived alongside 3.
        let survivors = [1, 2].iter().filter(|&&k| cache.contains(&k)).count();
        assert_eq!(survivors, 1);
        assert!(cache.contains(&3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn pop_lfu_returns_lowest_bucket_first() {
        let mut cache = LfuCache::new(4);

        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.get(&2);

        let (key, value) = cache.pop_lfu().unwrap();
        assert_eq!((key, value), (1, 10));

        let (key, value) = cache.pop_lfu().unwrap();
        assert_eq!((key, value), (2, 20));
        assert_eq!(cache.pop_lfu(), None);
    }

    #[test]
    fn peek_lfu_does_not_mutate() {
        let mut cache = LfuCache::new(4);

        cache.insert(1, 10);
        cache.get(&1);
        cache.insert(2, 20);

        assert_eq!(cache.peek_lfu(), Some((&2, &20)));
        assert_eq!(cache.peek_lfu(), Some((&2, &20)));
        assert_eq!(cache.frequency(&2), Some(1));
    }

    #[test]
    fn remove_recomputes_min_frequency() {
        let mut cache = LfuCache::new(4);

        cache.insert(1, 10);
        cache.get(&1);
        cache.get(&1);
        cache.insert(2, 20);

        assert_eq!(cache.remove(&2), Some(20));

        // key 1 (freq 3) is now the eviction victim
        assert_eq!(cache.peek_lfu(), Some((&1, &10)));
    }

    #[test]
    fn len_never_exceeds_capacity() {
        let mut cache = LfuCache::new(3);
        for i in 0..50u32 {
            cache.insert(i, i);
            assert!(cache.len() <= cache.capacity());
        }
    }

    #[test]
    fn clear_resets_state() {
        let mut cache = LfuCache::new(3);
        cache.insert(1, 10);
        cache.get(&1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.frequency(&1), None);

        cache.insert(2, 20);
        assert_eq!(cache.peek_lfu(), Some((&2, &20)));
    }
}
