//! # Threshold Counter (Lossy Counting)
//!
//! Bounded, approximate frequency counter. Keys whose relative frequency is
//! at least `threshold` are always tracked; rarer keys may be dropped at any
//! compaction boundary, which keeps memory near `O(1 / threshold)` entries
//! no matter how many distinct keys flow through.
//!
//! ## Compaction
//!
//! ```text
//!   thresh_count = floor(1 / threshold)        window length
//!   cur_bucket   = 1, 2, 3, ...                window number
//!
//!   add(k):   total += 1
//!             k tracked → count += 1
//!             k new     → (count, offset) = (1, cur_bucket - 1)
//!             total % thresh_count == 0 →
//!                 keep entries with count + offset > cur_bucket
//!                 cur_bucket += 1
//! ```
//!
//! A surviving entry must have been seen more often than once per window
//! since it was first observed, so a key with true frequency at or above the
//! threshold is never culled once it is tracked.
//!
//! ## Example
//!
//! ```
//! use boundcache::threshold_counter::ThresholdCounter;
//!
//! let mut counter = ThresholdCounter::new(0.1).unwrap();
//! counter.add("rare");
//! counter.update(std::iter::repeat_n("hot", 10));
//!
//! assert_eq!(counter.get(&"rare"), 0);   // culled at the first compaction
//! assert_eq!(counter.get(&"hot"), 10);
//! assert_eq!(counter.total(), 11);
//! assert_eq!(counter.uncommon_count(), 1);
//! ```
//!
//! `ThresholdCounter` is a single-writer structure: mutation takes
//! `&mut self`. Wrap it in a `parking_lot::Mutex` to share it.
use std::cmp::Reverse;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::CacheError;

/// Approximate frequency counter using the Lossy Counting algorithm.
#[derive(Debug, Clone)]
pub struct ThresholdCounter<K> {
    total: u64,
    threshold: f64,
    thresh_count: u64,
    cur_bucket: u64,
    // key -> (count in window, bucket when first seen minus one)
    counts: FxHashMap<K, (u64, u64)>,
}

impl<K> ThresholdCounter<K>
where
    K: Eq + Hash,
{
    pub const DEFAULT_THRESHOLD: f64 = 0.001;

    /// Creates a counter that tracks keys at or above `threshold` of all adds.
    ///
    /// Fails with [`CacheError::InvalidArgument`] unless `0 < threshold < 1`.
    pub fn new(threshold: f64) -> Result<Self, CacheError> {
        if !(threshold > 0.0 && threshold < 1.0) {
            warn!(threshold, "rejected threshold counter configuration");
            return Err(CacheError::invalid(format!(
                "threshold must be between 0 and 1 exclusive, got {threshold}"
            )));
        }
        Ok(Self {
            total: 0,
            threshold,
            thresh_count: (1.0 / threshold) as u64,
            cur_bucket: 1,
            counts: FxHashMap::default(),
        })
    }

    /// Number of `add` calls ever made.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of adds between compactions.
    #[inline]
    pub fn compaction_interval(&self) -> u64 {
        self.thresh_count
    }

    /// Number of currently tracked keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.counts.contains_key(key)
    }

    /// Counts one occurrence of `key`, compacting at window boundaries.
    pub fn add(&mut self, key: K) {
        self.total += 1;
        let offset = self.cur_bucket - 1;
        self.counts
            .entry(key)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, offset));

        if self.total % self.thresh_count == 0 {
            self.compact();
        }
    }

    /// Calls [`add`](Self::add) once per element.
    pub fn update<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
    {
        for key in keys {
            self.add(key);
        }
    }

    /// Calls [`add`](Self::add) `n` times for every `(key, n)` pair.
    pub fn update_counts<I>(&mut self, counts: I)
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Clone,
    {
        for (key, n) in counts {
            for _ in 0..n {
                self.add(key.clone());
            }
        }
    }

    /// Approximate count for `key`, or `None` if it is not tracked.
    pub fn count(&self, key: &K) -> Option<u64> {
        self.counts.get(key).map(|&(count, _)| count)
    }

    /// Approximate count for `key`; culled and unseen keys report `0`.
    pub fn get(&self, key: &K) -> u64 {
        self.get_or(key, 0)
    }

    /// Approximate count for `key`, or `default` when it is not tracked.
    pub fn get_or(&self, key: &K, default: u64) -> u64 {
        self.count(key).unwrap_or(default)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.counts.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.values().map(|&(count, _)| count)
    }

    /// Iterates `(key, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(key, &(count, _))| (key, count))
    }

    /// Yields every tracked key once per counted occurrence.
    pub fn elements(&self) -> impl Iterator<Item = &K> {
        self.counts
            .iter()
            .flat_map(|(key, &(count, _))| {
                std::iter::repeat_n(key, usize::try_from(count).unwrap_or(usize::MAX))
            })
    }

    /// Tracked keys by descending count; all of them when `n` is `None`.
    pub fn most_common(&self, n: Option<usize>) -> Vec<(K, u64)>
    where
        K: Clone,
    {
        let mut pairs: Vec<(K, u64)> = self
            .counts
            .iter()
            .map(|(key, &(count, _))| (key.clone(), count))
            .collect();
        pairs.sort_by_key(|&(_, count)| Reverse(count));
        if let Some(n) = n {
            pairs.truncate(n);
        }
        pairs
    }

    /// Sum of all tracked counts.
    pub fn common_count(&self) -> u64 {
        self.values().sum()
    }

    /// Occurrences lost to compaction: `total - common_count`.
    pub fn uncommon_count(&self) -> u64 {
        self.total - self.common_count()
    }

    /// Share of all adds still represented by tracked counts.
    ///
    /// Close to `1.0` for skewed data; `0.0` before any add.
    pub fn commonality(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.common_count() as f64 / self.total as f64
    }

    fn compact(&mut self) {
        let bucket = self.cur_bucket;
        let before = self.counts.len();
        self.counts
            .retain(|_, &mut (count, offset)| count + offset > bucket);
        self.cur_bucket += 1;
        debug!(
            bucket,
            dropped = before - self.counts.len(),
            kept = self.counts.len(),
            "threshold counter compacted"
        );
    }
}

impl<K> Default for ThresholdCounter<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            total: 0,
            threshold: Self::DEFAULT_THRESHOLD,
            thresh_count: (1.0 / Self::DEFAULT_THRESHOLD) as u64,
            cur_bucket: 1,
            counts: FxHashMap::default(),
        }
    }
}

impl<K> Extend<K> for ThresholdCounter<K>
where
    K: Eq + Hash,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.update(iter);
    }
}
