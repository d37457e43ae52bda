//! Count-Min Sketch: approximate frequency estimation with aging.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                    CountMinSketch (width W, depth D)                 │
//! │                                                                      │
//! │             col = mix(fx_hash(key), SEED[row]) & (W - 1)             │
//! │                                                                      │
//! │   row 0   [ 3 | 0 | 7 | 1 | ... | 0 ]   ◄── one counter touched      │
//! │   row 1   [ 0 | 9 | 0 | 4 | ... | 2 ]       per row per observe()    │
//! │   row 2   [ 1 | 0 | 0 | 8 | ... | 0 ]                                │
//! │   row 3   [ 5 | 2 | 3 | 0 | ... | 1 ]                                │
//! │                                                                      │
//! │   estimate(key) = min over rows of the touched counters              │
//! │   decay_half()  = every counter >>= 1                                │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Properties
//!
//! | Property      | Guarantee                                               |
//! |---------------|---------------------------------------------------------|
//! | One-sided     | `estimate(k)` never under-counts between decays         |
//! | Saturating    | Counters stop at `u32::MAX`, no wraparound              |
//! | Aging         | `decay_half` halves every counter so hot keys can fade  |
//! | Masked index  | Width is a power of two, so `& (W-1)` replaces modulo   |
//!
//! Decay is a policy knob, not automatic; the owning cache decides when to
//! call it.
//!
//! ## Example
//!
//! ```
//! use admitkit::ds::CountMinSketch;
//!
//! let mut cms = CountMinSketch::new(1024, 4);
//! for _ in 0..10 {
//!     cms.observe(&42u64);
//! }
//! assert!(cms.estimate(&42u64) >= 10);
//!
//! cms.decay_half();
//! assert!(cms.estimate(&42u64) >= 5);
//! ```

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::error::ConfigError;

/// Per-row mixing seeds. Eight rows is the supported maximum.
const ROW_SEEDS: [u64; 8] = [
    0x9e37_79b1_85eb_ca87,
    0xc2b2_ae3d_27d4_eb4f,
    0x1656_67b1_9e37_79f9,
    0xd6e8_feb8_6659_fd93,
    0x94d0_49bb_1331_11eb,
    0x2545_f491_4f6c_dd1d,
    0x6064_2e2a_3432_6f15,
    0x9e37_79b9_7f4a_7c15,
];

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Approximate frequency estimator with saturating counters and halving decay.
///
/// Depth rows of width counters, stored as one flat row-major table. Each
/// observed key touches one counter per row; the estimate is the minimum of
/// the touched counters, so collisions can only inflate it.
///
/// Not thread-safe; protected by the containing shard's lock.
#[derive(Debug, Clone)]
pub struct CountMinSketch {
    width: usize,
    depth: usize,
    rows: Vec<u32>,
}

impl CountMinSketch {
    /// Creates a sketch with `width` counters per row and `depth` rows.
    ///
    /// `width` must be a non-zero power of two and `depth` must be in
    /// `1..=8`.
    pub fn try_new(width: usize, depth: usize) -> Result<Self, ConfigError> {
        if width == 0 || !width.is_power_of_two() {
            return Err(ConfigError::new(format!(
                "sketch width must be a power of two, got {width}"
            )));
        }
        if depth == 0 || depth > ROW_SEEDS.len() {
            return Err(ConfigError::new(format!(
                "sketch depth must be in 1..={}, got {depth}",
                ROW_SEEDS.len()
            )));
        }
        Ok(Self {
            width,
            depth,
            rows: vec![0; width * depth],
        })
    }

    /// Creates a sketch, panicking on an invalid configuration.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not a non-zero power of two or `depth` is not in
    /// `1..=8`. Use [`try_new`](Self::try_new) to handle the error instead.
    pub fn new(width: usize, depth: usize) -> Self {
        match Self::try_new(width, depth) {
            Ok(sketch) => sketch,
            Err(err) => panic!("{err}"),
        }
    }

    /// Records one observation of `key` in every row, saturating at
    /// `u32::MAX`.
    pub fn observe<K: Hash>(&mut self, key: &K) {
        let base = base_hash(key);
        for row in 0..self.depth {
            let idx = row * self.width + self.column(base, row);
            let counter = &mut self.rows[idx];
            *counter = counter.saturating_add(1);
        }
    }

    /// Returns the estimated observation count for `key`.
    ///
    /// The estimate is the minimum counter across all rows: it never
    /// under-counts between decays, and collisions only inflate it.
    pub fn estimate<K: Hash>(&self, key: &K) -> u32 {
        let base = base_hash(key);
        let mut min = u32::MAX;
        for row in 0..self.depth {
            let idx = row * self.width + self.column(base, row);
            min = min.min(self.rows[idx]);
        }
        min
    }

    /// Halves every counter.
    ///
    /// This is the aging step that lets a newly hot key overtake a previously
    /// hot one within bounded time.
    pub fn decay_half(&mut self) {
        for counter in &mut self.rows {
            *counter >>= 1;
        }
    }

    /// Returns the number of counters per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    fn column(&self, base: u64, row: usize) -> usize {
        let mut h = base;
        h ^= ROW_SEEDS[row]
            .wrapping_add(GOLDEN_GAMMA)
            .wrapping_add(h << 6)
            .wrapping_add(h >> 2);
        (h as usize) & (self.width - 1)
    }
}

#[inline]
fn base_hash<K: Hash>(key: &K) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two_width() {
        assert!(CountMinSketch::try_new(1000, 4).is_err());
        assert!(CountMinSketch::try_new(0, 4).is_err());
        assert!(CountMinSketch::try_new(1024, 4).is_ok());
    }

    #[test]
    fn rejects_bad_depth() {
        assert!(CountMinSketch::try_new(1024, 0).is_err());
        assert!(CountMinSketch::try_new(1024, 9).is_err());
        assert!(CountMinSketch::try_new(1024, 8).is_ok());
    }

    #[test]
    fn width_one_is_valid_and_counts_everything_together() {
        // Every key collides into the single counter per row, so the
        // estimate equals the total number of observations.
        let mut cms = CountMinSketch::new(1, 4);
        for key in 0..10u64 {
            cms.observe(&key);
        }
        assert_eq!(cms.estimate(&0u64), 10);
        assert_eq!(cms.estimate(&999u64), 10);
    }

    #[test]
    fn single_key_estimate_is_exact() {
        let mut cms = CountMinSketch::new(1024, 4);
        for _ in 0..1000 {
            cms.observe(&7u64);
        }
        assert_eq!(cms.estimate(&7u64), 1000);
    }

    #[test]
    fn estimate_is_monotone_between_decays() {
        let mut cms = CountMinSketch::new(256, 4);
        let mut last = 0;
        for _ in 0..100 {
            cms.observe(&"hot");
            let now = cms.estimate(&"hot");
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn estimate_never_undercounts() {
        let mut cms = CountMinSketch::new(16, 2);
        let mut true_counts = std::collections::HashMap::new();
        for i in 0..500u64 {
            let key = i % 37;
            cms.observe(&key);
            *true_counts.entry(key).or_insert(0u32) += 1;
        }
        for (key, count) in true_counts {
            assert!(cms.estimate(&key) >= count);
        }
    }

    #[test]
    fn decay_halves_exactly_without_collisions() {
        let mut cms = CountMinSketch::new(1024, 4);
        for _ in 0..1000 {
            cms.observe(&1u64);
        }
        cms.decay_half();
        assert_eq!(cms.estimate(&1u64), 500);
        cms.decay_half();
        assert_eq!(cms.estimate(&1u64), 250);
    }

    #[test]
    fn decay_never_increases_any_estimate() {
        let mut cms = CountMinSketch::new(64, 3);
        for i in 0..300u64 {
            cms.observe(&(i % 11));
        }
        let before: Vec<u32> = (0..11u64).map(|k| cms.estimate(&k)).collect();
        cms.decay_half();
        for (k, prev) in before.iter().enumerate() {
            assert!(cms.estimate(&(k as u64)) <= *prev);
        }
    }

    #[test]
    fn unseen_key_can_read_zero() {
        let cms = CountMinSketch::new(1024, 4);
        assert_eq!(cms.estimate(&42u64), 0);
    }
}
