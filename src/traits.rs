//! # Policy Seam
//!
//! Both bounded caches share one engine,
//! [`BoundedCache`](crate::policy::bounded::BoundedCache). The only thing that
//! differs between them is whether a read moves the entry to the most-recent
//! end of the recency list. That single decision is expressed by
//! [`RecencyPolicy`], a zero-sized type parameter resolved at compile time.
//!
//! ```text
//!                    ┌────────────────────────────────────┐
//!                    │      BoundedCache<K, V, P>         │
//!                    │                                    │
//!                    │  insert   → always promotes        │
//!                    │  get/...  → promotes iff           │
//!                    │             P::PROMOTE_ON_READ     │
//!                    └─────────────────┬──────────────────┘
//!                                      │
//!                 ┌────────────────────┴────────────────────┐
//!                 ▼                                         ▼
//!   ┌────────────────────────────┐           ┌────────────────────────────┐
//!   │  Lri (least recently       │           │  Lru (least recently       │
//!   │       inserted)            │           │       used)                │
//!   │  PROMOTE_ON_READ = false   │           │  PROMOTE_ON_READ = true    │
//!   └────────────────────────────┘           └────────────────────────────┘
//! ```
//!
//! ## Policy Comparison
//!
//! | Policy | Read reorders | Overwrite reorders | Victim                     |
//! |--------|---------------|--------------------|----------------------------|
//! | LRI    | No            | Yes                | Oldest insert/overwrite    |
//! | LRU    | Yes           | Yes                | Oldest insert/overwrite/read |

/// Recency rule applied by a bounded cache.
///
/// # Example
///
/// ```
/// use boundcache::policy::{Lri, Lru};
/// use boundcache::traits::RecencyPolicy;
///
/// assert!(!Lri::PROMOTE_ON_READ);
/// assert!(Lru::PROMOTE_ON_READ);
/// assert_eq!(Lru::NAME, "LRU");
/// ```
pub trait RecencyPolicy: Send + Sync + 'static {
    /// Short policy name used in `Debug` output and log events.
    const NAME: &'static str;

    /// Whether a successful read moves the entry to the most-recent end.
    const PROMOTE_ON_READ: bool;
}

/// Marker trait for caches that are safe to share across threads.
///
/// Implemented by every [`BoundedCache`](crate::policy::bounded::BoundedCache)
/// whose keys and values are `Send`.
///
/// # Example
///
/// ```
/// use boundcache::policy::lru::LruCache;
/// use boundcache::traits::ConcurrentCache;
///
/// fn share<C: ConcurrentCache>(_cache: &C) {}
///
/// let cache: LruCache<u64, String> = LruCache::new(8).unwrap();
/// share(&cache);
/// ```
pub trait ConcurrentCache: Send + Sync {}
