//! Point-in-time counter snapshot for bounded caches.
//!
//! Counters are recorded under the cache lock, so one snapshot is always
//! internally consistent: `soft_miss_count <= miss_count` and
//! `len <= max_size`.

/// Counters and gauges captured by
/// [`BoundedCache::stats`](crate::policy::bounded::BoundedCache::stats).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that found their key.
    pub hit_count: u64,
    /// Reads that did not find their key, soft or hard.
    pub miss_count: u64,
    /// Misses answered with a caller-supplied default.
    pub soft_miss_count: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub max_size: usize,
}

impl CacheStats {
    /// Total number of counted reads.
    pub fn lookups(&self) -> u64 {
        self.hit_count + self.miss_count
    }

    /// Fraction of counted reads that hit, or `0.0` before any read.
    pub fn hit_ratio(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            n => self.hit_count as f64 / n as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_ratio_of_empty_snapshot_is_zero() {
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);
    }

    #[test]
    fn hit_ratio_counts_soft_misses_once() {
        let stats = CacheStats {
            hit_count: 3,
            miss_count: 1,
            soft_miss_count: 1,
            len: 2,
            max_size: 2,
        };
        assert_eq!(stats.lookups(), 4);
        assert!((stats.hit_ratio() - 0.75).abs() < f64::EPSILON);
    }
}
