//! Shared sharding helpers for consistent shard selection.
//!
//! Provides the deterministic key-to-shard mapping and the capacity split used
//! by [`ShardedCache`](crate::sharded::ShardedCache) and
//! [`PredictiveCache`](crate::predictive::PredictiveCache).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shard Selection Flow                            │
//! │                                                                         │
//! │   Input Key                                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   ┌───────────────────────────────────────────────────────────────┐     │
//! │   │  ShardSelector { shards: 4, seed: 0 }                         │     │
//! │   │                                                               │     │
//! │   │  1. Create DefaultHasher                                      │     │
//! │   │  2. Hash seed: 0.hash(&mut hasher)                            │     │
//! │   │  3. Hash key:  key.hash(&mut hasher)                          │     │
//! │   │  4. Compute:   hasher.finish() % 4                            │     │
//! │   └───────────────────────────────────────────────────────────────┘     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   Shard Index: 0, 1, 2, or 3                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//!
//! Properties
//! ──────────
//! • Deterministic: Same (key, seed, shards) always yields same shard
//! • Uniform: Keys distribute evenly across shards (given a good Hash impl)
//! • Seed isolation: Different seeds produce different distributions
//! ```
//!
//! The capacity split gives every shard `total / n` entries and hands the
//! remainder to the last shard, so the per-shard capacities always sum to the
//! configured total:
//!
//! ```
//! use admitkit::ds::shard_capacities;
//!
//! assert_eq!(shard_capacities(10, 4), vec![2, 2, 2, 4]);
//! assert_eq!(shard_capacities(8, 4), vec![2, 2, 2, 2]);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic shard selector using a seeded hash.
///
/// Maps any `Hash`able key to a shard index in `[0, shards)`. The same
/// `(key, seed, shards)` tuple always produces the same result, so a key's
/// shard is a pure function of the key for a given selector.
///
/// # Example
///
/// ```
/// use admitkit::ds::ShardSelector;
///
/// let selector = ShardSelector::new(8, 42);
///
/// // Deterministic: same key → same shard
/// let shard = selector.shard_for_key(&"my_key");
/// assert_eq!(selector.shard_for_key(&"my_key"), shard);
/// assert!(shard < 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards with the given `seed`.
    ///
    /// The shard count is clamped to at least 1; the cache constructors reject
    /// a zero shard count before building a selector.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps a key to a shard index in `[0, shards)`.
    pub fn shard_for_key<K: Hash>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards
    }
}

impl Default for ShardSelector {
    /// Creates a single-shard selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// Splits a total capacity across `shards` partitions.
///
/// Every shard receives `total / shards`; the last shard additionally receives
/// `total % shards`. The returned capacities always sum to `total`.
///
/// # Panics
///
/// Panics if `shards` is 0. The cache constructors validate the shard count
/// and return a [`ConfigError`](crate::error::ConfigError) first.
pub fn shard_capacities(total: usize, shards: usize) -> Vec<usize> {
    assert!(shards > 0, "shards must be > 0");
    let base = total / shards;
    let extra = total % shards;
    (0..shards)
        .map(|i| if i == shards - 1 { base + extra } else { base })
        .collect()
}
