//! # Least Recently Inserted (LRI) Cache
//!
//! Eviction follows insertion and overwrite time only. Reads count hits and
//! misses but never reorder entries, so a hot key that is only read will
//! still age out once `max_size` newer keys have been written.
//!
//! ```text
//!   max_size = 2
//!
//!   insert(a) insert(b)      ring: [a] ─► [b]          (a is the victim)
//!   get(b) × 3               ring: [a] ─► [b]          (unchanged)
//!   insert(c)                ring: [b] ─► [c]          (a evicted)
//!   insert(b, b')            ring: [c] ─► [b]          (overwrite promotes)
//! ```

use crate::policy::bounded::BoundedCache;
use crate::traits::RecencyPolicy;

/// Least-recently-inserted policy marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lri;

impl RecencyPolicy for Lri {
    const NAME: &'static str = "LRI";
    const PROMOTE_ON_READ: bool = false;
}

/// Bounded cache that evicts the least recently inserted or overwritten key.
pub type LriCache<K, V> = BoundedCache<K, V, Lri>;
