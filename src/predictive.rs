//! # Predictive Shard Wrapper
//!
//! Overlays a per-shard first-order Markov model on a sharded TinyLFU cache
//! and prefetches likely successors of each accessed key.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                        PredictiveCache<K, V>                         │
//!   │                                                                      │
//!   │   per shard:  Mutex< MarkovPredictor + last-seen key >               │
//!   │                                                                      │
//!   │   get(k):                                                            │
//!   │     1. lock predictor state of k's shard                             │
//!   │     2. observe(prev, k); prev = k; compute top-K successors          │
//!   │     3. unlock                                   ◄── no two locks     │
//!   │     4. look k up in the sharded TinyLFU base        are ever held    │
//!   │     5. for each absent successor: insert a placeholder through the   │
//!   │        base's normal admission path (routes to the successor's own   │
//!   │        shard)                                                        │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Placeholders
//!
//! Prefetch inserts a marked stand-in, not a fabricated value. A lookup that
//! lands on a placeholder returns absent to the caller while still promoting
//! the entry and counting in the sketch, so the slot is warm when the real
//! value arrives; the caller's subsequent insert overwrites the placeholder
//! in place. [`metrics_snapshot`](PredictiveCache::metrics_snapshot) reports
//! the three lookup outcomes (value hit, placeholder hit, cold miss)
//! separately. [`contains`](PredictiveCache::contains) reports residency and
//! counts placeholders.
//!
//! The prefetch path checks candidates with a promoting lookup: a predicted
//! successor that is already resident is moved to the MRU position of its
//! shard (protected), and only an absent successor is prefetched.
//!
//! ## Learning
//!
//! Transitions are recorded on every access, including when prefetch is
//! disabled ([`set_prefetch_enabled`](PredictiveCache::set_prefetch_enabled)),
//! so enabling prefetch later does not start cold. The chain is per shard:
//! an access extends the chain of the shard its key hashes to.
//!
//! Model decay ([`decay_models`](PredictiveCache::decay_models)) and sketch
//! decay ([`decay`](PredictiveCache::decay)) are separate maintenance calls
//! with separate schedules.

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::ds::{MarkovPredictor, ShardSelector};
use crate::error::ConfigError;
use crate::metrics::{PredictiveMetrics, PredictiveMetricsSnapshot, TinyLfuMetricsSnapshot};
use crate::policy::tiny_lfu::{DEFAULT_SKETCH_DEPTH, DEFAULT_SKETCH_WIDTH};
use crate::policy::TinyLfuCache;
use crate::sharded::ShardedCache;
use crate::traits::ConcurrentCache;

/// Tuning knobs for [`PredictiveCache`].
///
/// | Field             | Effect                                              |
/// |-------------------|-----------------------------------------------------|
/// | `shards`          | Number of partitions (and predictor instances)      |
/// | `prefetch_topk`   | Successors prefetched per access; 0 disables        |
/// | `min_trans_count` | Observations of `p → k` before it is a candidate    |
/// | `min_trans_prob`  | Conditional probability floor for candidacy         |
/// | `enable_prefetch` | Master switch; learning continues when `false`      |
/// | `cms_width`       | Per-shard sketch width (power of two)               |
/// | `cms_depth`       | Per-shard sketch rows                               |
#[derive(Debug, Clone, PartialEq)]
pub struct PredictiveOptions {
    pub shards: usize,
    pub prefetch_topk: usize,
    pub min_trans_count: u32,
    pub min_trans_prob: f64,
    pub enable_prefetch: bool,
    pub cms_width: usize,
    pub cms_depth: usize,
}

impl Default for PredictiveOptions {
    fn default() -> Self {
        Self {
            shards: 8,
            prefetch_topk: 1,
            min_trans_count: 4,
            min_trans_prob: 0.2,
            enable_prefetch: true,
            cms_width: DEFAULT_SKETCH_WIDTH,
            cms_depth: DEFAULT_SKETCH_DEPTH,
        }
    }
}

/// Stored entry of the underlying sharded cache: a caller-supplied value or a
/// prefetched stand-in.
enum Slot<V> {
    Value(Arc<V>),
    Placeholder,
}

impl<V> Clone for Slot<V> {
    fn clone(&self) -> Self {
        match self {
            Slot::Value(value) => Slot::Value(Arc::clone(value)),
            Slot::Placeholder => Slot::Placeholder,
        }
    }
}

struct PredictorState<K>
where
    K: Copy + Eq + Hash,
{
    predictor: MarkovPredictor<K>,
    prev: Option<K>,
}

/// Sharded TinyLFU cache with per-shard Markov prefetch.
///
/// Thread-safe: every method takes `&self`. A predictor lock and a base
/// shard lock are never held at the same time, so prefetched keys may hash
/// to any shard without risking nested locking.
///
/// # Example
///
/// ```
/// use admitkit::predictive::{PredictiveCache, PredictiveOptions};
///
/// let opts = PredictiveOptions {
///     shards: 1,
///     min_trans_count: 2,
///     min_trans_prob: 0.1,
///     ..PredictiveOptions::default()
/// };
/// let cache: PredictiveCache<u32, String> = PredictiveCache::new(4, opts);
///
/// // Teach the chain 0 → 1 a few times.
/// for _ in 0..3 {
///     cache.get(&0);
///     cache.get(&1);
/// }
///
/// assert_eq!(cache.predicted_next(&0), vec![1]);
/// ```
pub struct PredictiveCache<K, V>
where
    K: Copy + Eq + Hash,
{
    base: ShardedCache<K, Slot<V>, TinyLfuCache<K, Slot<V>>>,
    states: Box<[Mutex<PredictorState<K>>]>,
    selector: ShardSelector,
    opts: PredictiveOptions,
    prefetch_enabled: AtomicBool,
    metrics: PredictiveMetrics,
}

impl<K, V> PredictiveCache<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Creates a predictive cache with `capacity` entries split across
    /// `opts.shards` partitions.
    ///
    /// Fails on zero capacity, zero shards, a capacity smaller than the
    /// shard count, an invalid sketch configuration, or a probability floor
    /// outside `[0, 1]`.
    pub fn try_new(capacity: usize, opts: PredictiveOptions) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&opts.min_trans_prob) {
            return Err(ConfigError::new(format!(
                "min_trans_prob must be within [0, 1], got {}",
                opts.min_trans_prob
            )));
        }

        let base: ShardedCache<K, Slot<V>, TinyLfuCache<K, Slot<V>>> =
            ShardedCache::<K, Slot<V>, TinyLfuCache<K, Slot<V>>>::try_new(
                capacity,
                opts.shards,
                opts.cms_width,
                opts.cms_depth,
            )?;
        let selector = base.selector();
        let states = (0..opts.shards)
            .map(|_| {
                Mutex::new(PredictorState {
                    predictor: MarkovPredictor::new(),
                    prev: None,
                })
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        let prefetch_enabled = AtomicBool::new(opts.enable_prefetch);
        Ok(Self {
            base,
            states,
            selector,
            opts,
            prefetch_enabled,
            metrics: PredictiveMetrics::default(),
        })
    }

    /// Creates a predictive cache, panicking on an invalid configuration.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions [`try_new`](Self::try_new) errors.
    pub fn new(capacity: usize, opts: PredictiveOptions) -> Self {
        match Self::try_new(capacity, opts) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Looks up a key, learning the transition from the previous key seen on
    /// this shard and prefetching predicted successors.
    ///
    /// Returns the stored value, or `None` on a cold miss or a placeholder
    /// hit.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let shard = self.selector.shard_for_key(key);

        let candidates = {
            let mut state = self.states[shard].lock();
            if let Some(prev) = state.prev {
                state.predictor.observe(prev, *key);
            }
            state.prev = Some(*key);

            if self.prefetch_enabled.load(Ordering::Relaxed) && self.opts.prefetch_topk > 0 {
                state.predictor.topk_next(
                    key,
                    self.opts.prefetch_topk,
                    self.opts.min_trans_count,
                    self.opts.min_trans_prob,
                )
            } else {
                Vec::new()
            }
        };

        let result = match self.base.get(key) {
            Some(Slot::Value(value)) => {
                self.metrics.record_value_hit();
                Some(value)
            }
            Some(Slot::Placeholder) => {
                self.metrics.record_placeholder_hit();
                None
            }
            None => {
                self.metrics.record_miss();
                None
            }
        };

        for next in candidates {
            // A hit protects the predicted entry by promoting it; only an
            // absent successor is prefetched.
            if self.base.get(&next).is_none() {
                self.base.insert(next, Slot::Placeholder);
                self.metrics.record_prefetch_insert();
            }
        }

        result
    }

    /// Inserts a value through the admission path and treats the insert as an
    /// access for sequence learning.
    ///
    /// Returns the previous real value when the key was resident with one;
    /// an overwritten placeholder reads as `None`.
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        let previous = self.base.insert(key, Slot::Value(Arc::new(value)));
        let shard = self.selector.shard_for_key(&key);
        self.states[shard].lock().prev = Some(key);

        match previous {
            Some(Slot::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Removes a key from its shard.
    ///
    /// Returns the removed real value; removing a placeholder (or nothing)
    /// returns `None`.
    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        match self.base.remove(key) {
            Some(Slot::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Checks residency; prefetched placeholders count as resident.
    pub fn contains(&self, key: &K) -> bool {
        self.base.contains(key)
    }

    /// Sums per-shard sizes, locking shards sequentially (snapshot
    /// semantics). Placeholders count toward the size.
    pub fn len(&self) -> usize {
        self.base.len()
    }

    /// Returns `true` if no shard currently holds an entry.
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Returns the total configured capacity.
    pub fn capacity(&self) -> usize {
        self.base.capacity()
    }

    /// Returns the number of partitions.
    pub fn shard_count(&self) -> usize {
        self.base.shard_count()
    }

    /// Returns whether prefetch is currently enabled.
    pub fn prefetch_enabled(&self) -> bool {
        self.prefetch_enabled.load(Ordering::Relaxed)
    }

    /// Turns prefetch on or off at runtime.
    ///
    /// Learning continues while prefetch is off, so enabling it later does
    /// not start cold.
    pub fn set_prefetch_enabled(&self, enabled: bool) {
        self.prefetch_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Empties every shard and resets the per-shard access chains.
    ///
    /// The learned transition models are retained; after a clear, prefetch
    /// resumes from the first accesses.
    pub fn clear(&self) {
        self.base.clear();
        for state in self.states.iter() {
            state.lock().prev = None;
        }
    }

    /// Current prefetch candidates for `key` on its shard, most probable
    /// first. Observes nothing; the access chain is untouched.
    pub fn predicted_next(&self, key: &K) -> Vec<K> {
        let shard = self.selector.shard_for_key(key);
        let state = self.states[shard].lock();
        state.predictor.topk_next(
            key,
            self.opts.prefetch_topk.max(1),
            self.opts.min_trans_count,
            self.opts.min_trans_prob,
        )
    }

    /// Halves every per-shard predictor, one lock at a time.
    ///
    /// The underlying sketches are decayed separately by [`decay`](Self::decay).
    pub fn decay_models(&self) {
        for state in self.states.iter() {
            state.lock().predictor.decay_half();
        }
    }

    /// Halves every shard's frequency sketch. Predictors are untouched.
    pub fn decay(&self) {
        self.base.decay();
    }

    /// Lookup-outcome counters for this wrapper.
    pub fn metrics_snapshot(&self) -> PredictiveMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Aggregated admission counters of the underlying TinyLFU shards.
    pub fn admission_metrics(&self) -> TinyLfuMetricsSnapshot {
        self.base.metrics_snapshot()
    }
}

impl<K, V> ConcurrentCache for PredictiveCache<K, V>
where
    K: Copy + Eq + Hash + Send,
    V: Send + Sync,
{
}

impl<K, V> std::fmt::Debug for PredictiveCache<K, V>
where
    K: Copy + Eq + Hash,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictiveCache")
            .field("shards", &self.shard_count())
            .field("capacity", &self.capacity())
            .field("prefetch_topk", &self.opts.prefetch_topk)
            .field("prefetch_enabled", &self.prefetch_enabled())
            .finish_non_exhaustive()
    }
}
