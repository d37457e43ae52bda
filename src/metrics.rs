//! Operation counters and snapshots.
//!
//! Counter structs live inside the cache types and are updated under the same
//! lock (or `&mut` borrow) that protects the data they describe, so the plain
//! `u64` fields need no synchronization of their own. The predictive wrapper
//! records outcomes outside any single shard lock and therefore uses relaxed
//! atomics.
//!
//! Snapshots are plain data: cheap to copy, safe to hold after the cache has
//! moved on. Aggregate observers produce a value that was true for some
//! interleaving of per-shard reads, not necessarily for any single instant.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by [`TinyLfuCache`](crate::policy::tiny_lfu::TinyLfuCache).
#[derive(Debug, Default, Clone)]
pub(crate) struct TinyLfuMetrics {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_updates: u64,
    pub insert_fills: u64,
    pub insert_admitted: u64,
    pub insert_rejected: u64,
    pub decays: u64,
}

impl TinyLfuMetrics {
    #[inline]
    pub fn record_get(&mut self, hit: bool) {
        if hit {
            self.get_hits += 1;
        } else {
            self.get_misses += 1;
        }
    }

    #[inline]
    pub fn record_update(&mut self) {
        self.insert_updates += 1;
    }

    #[inline]
    pub fn record_fill(&mut self) {
        self.insert_fills += 1;
    }

    #[inline]
    pub fn record_admitted(&mut self) {
        self.insert_admitted += 1;
    }

    #[inline]
    pub fn record_rejected(&mut self) {
        self.insert_rejected += 1;
    }

    #[inline]
    pub fn record_decay(&mut self) {
        self.decays += 1;
    }

    pub fn snapshot(&self) -> TinyLfuMetricsSnapshot {
        TinyLfuMetricsSnapshot {
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_updates: self.insert_updates,
            insert_fills: self.insert_fills,
            insert_admitted: self.insert_admitted,
            insert_rejected: self.insert_rejected,
            decays: self.decays,
        }
    }
}

/// Point-in-time view of a TinyLFU cache's counters.
///
/// Obtained from
/// [`TinyLfuCache::metrics_snapshot`](crate::policy::tiny_lfu::TinyLfuCache::metrics_snapshot)
/// or, summed across shards, from
/// [`ShardedTinyLfu::metrics_snapshot`](crate::sharded::ShardedCache::metrics_snapshot).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TinyLfuMetricsSnapshot {
    /// Lookups that found a resident entry.
    pub get_hits: u64,
    /// Lookups that found nothing.
    pub get_misses: u64,
    /// Inserts that overwrote a resident entry.
    pub insert_updates: u64,
    /// Inserts accepted while below capacity.
    pub insert_fills: u64,
    /// At-capacity inserts that won the admission comparison.
    pub insert_admitted: u64,
    /// At-capacity inserts declined by the admission filter.
    pub insert_rejected: u64,
    /// Sketch decay invocations.
    pub decays: u64,
}

impl TinyLfuMetricsSnapshot {
    /// Fraction of lookups that hit, or 0.0 when no lookups were recorded.
    pub fn hit_rate(&self) -> f64 {
        let total = self.get_hits + self.get_misses;
        if total == 0 {
            0.0
        } else {
            self.get_hits as f64 / total as f64
        }
    }

    /// Field-wise sum, used to aggregate per-shard snapshots.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            get_hits: self.get_hits + other.get_hits,
            get_misses: self.get_misses + other.get_misses,
            insert_updates: self.insert_updates + other.insert_updates,
            insert_fills: self.insert_fills + other.insert_fills,
            insert_admitted: self.insert_admitted + other.insert_admitted,
            insert_rejected: self.insert_rejected + other.insert_rejected,
            decays: self.decays + other.decays,
        }
    }
}

/// Counters maintained by [`PredictiveCache`](crate::predictive::PredictiveCache).
#[derive(Debug, Default)]
pub(crate) struct PredictiveMetrics {
    value_hits: AtomicU64,
    placeholder_hits: AtomicU64,
    misses: AtomicU64,
    prefetch_inserts: AtomicU64,
}

impl PredictiveMetrics {
    #[inline]
    pub fn record_value_hit(&self) {
        self.value_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_placeholder_hit(&self) {
        self.placeholder_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_prefetch_insert(&self) {
        self.prefetch_inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PredictiveMetricsSnapshot {
        PredictiveMetricsSnapshot {
            value_hits: self.value_hits.load(Ordering::Relaxed),
            placeholder_hits: self.placeholder_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            prefetch_inserts: self.prefetch_inserts.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a predictive cache's lookup outcomes.
///
/// A lookup lands in exactly one of three buckets: `value_hits` (a real value
/// was resident), `placeholder_hits` (a prefetched stand-in was resident, so
/// the caller saw a miss but the slot was warm), or `misses` (nothing was
/// resident).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PredictiveMetricsSnapshot {
    /// Lookups that returned a caller-supplied value.
    pub value_hits: u64,
    /// Lookups that found a prefetched placeholder.
    pub placeholder_hits: u64,
    /// Lookups that found nothing resident.
    pub misses: u64,
    /// Placeholder entries inserted by the prefetch path.
    pub prefetch_inserts: u64,
}

impl PredictiveMetricsSnapshot {
    /// Fraction of lookups that found nothing resident, warm or real.
    ///
    /// Placeholder hits are excluded from the numerator: the slot was
    /// prefetched before the access arrived.
    pub fn cold_miss_rate(&self) -> f64 {
        let total = self.value_hits + self.placeholder_hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.misses as f64 / total as f64
        }
    }
}
