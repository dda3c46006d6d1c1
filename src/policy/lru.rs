//! # Least Recently Used (LRU) Cache
//!
//! Same engine as the LRI cache; the only difference is that a successful
//! read (`get`, `get_opt`, `get_or`, `set_default` on a present key) moves
//! the entry to the most-recent end of the ring before returning it.
//!
//! ## Operations Flow
//!
//! ```text
//!   ACCESS existing item
//!   ═══════════════════════════════════════════════════════════════════════
//!
//!   Before:   [anchor] ─► [A] ─► [B] ─► [C]        A is the victim
//!
//!   get(A):
//!     1. Find A in the store: O(1)
//!     2. move_to_front(A): splice before the anchor, O(1)
//!
//!   After:    [anchor] ─► [B] ─► [C] ─► [A]        B is the victim
//!
//!   ═══════════════════════════════════════════════════════════════════════
//!
//!   PEEK (no reordering)
//!   ═══════════════════════════════════════════════════════════════════════
//!
//!   peek(B): store lookup only, ring untouched, counters untouched
//! ```
//!
//! ## Example
//!
//! ```
//! use boundcache::policy::lru::LruCache;
//!
//! let cache: LruCache<&str, &str> = LruCache::new(2).unwrap();
//! cache.insert("a", "A");
//! cache.insert("b", "B");
//! cache.get(&"a").unwrap();
//!
//! cache.insert("c", "C");
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! ```

use crate::policy::bounded::BoundedCache;
use crate::traits::RecencyPolicy;

/// Least-recently-used policy marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lru;

impl RecencyPolicy for Lru {
    const NAME: &'static str = "LRU";
    const PROMOTE_ON_READ: bool = true;
}

/// Bounded cache that evicts the least recently read or written key.
pub type LruCache<K, V> = BoundedCache<K, V, Lru>;

#[cfg(test)]
mod tests {
    use super::*;

    mod promotion {
        use super::*;

        #[test]
        fn read_promotes_entry() {
            let cache: LruCache<&str, &str> = LruCache::new(2).unwrap();
            cache.insert("a", "A");
            cache.insert("b", "B");
            assert_eq!(cache.get(&"a"), Ok("A"));
            assert_eq!(cache.insert("c", "C"), Some(("b", "B")));
            assert!(cache.contains(&"a"));
            assert!(cache.contains(&"c"));
        }

        #[test]
        fn every_read_form_promotes() {
            let cache: LruCache<u32, u32> = LruCache::new(4).unwrap();
            cache.update([(1, 1), (2, 2), (3, 3), (4, 4)]);

            cache.get(&1).unwrap();
            assert_eq!(cache.keys(), vec![2, 3, 4, 1]);
            cache.get_opt(&2);
            assert_eq!(cache.keys(), vec![3, 4, 1, 2]);
            cache.get_or(&3, 0);
            assert_eq!(cache.keys(), vec![4, 1, 2, 3]);
            cache.set_default(4, 0);
            assert_eq!(cache.keys(), vec![1, 2, 3, 4]);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn peek_does_not_promote() {
            let cache: LruCache<u32, u32> = LruCache::new(2).unwrap();
            cache.insert(1, 1);
            cache.insert(2, 2);
            cache.peek(&1);
            assert_eq!(cache.insert(3, 3), Some((1, 1)));
        }

        #[test]
        fn miss_does_not_disturb_order() {
            let cache: LruCache<u32, u32> = LruCache::new(2).unwrap();
            cache.insert(1, 1);
            cache.insert(2, 2);
            assert_eq!(cache.get_opt(&9), None);
            assert_eq!(cache.keys(), vec![1, 2]);
        }
    }

    mod scan {
        use super::*;

        #[test]
        fn hot_key_survives_scan() {
            let cache: LruCache<u64, u64> = LruCache::new(4).unwrap();
            cache.insert(0, 0);
            for i in 1..100 {
                cache.get(&0).unwrap();
                cache.insert(i, i);
            }
            assert!(cache.contains(&0));
            assert_eq!(cache.len(), 4);
            assert_eq!(cache.hit_count(), 99);
            cache.check_invariants().unwrap();
        }
    }
}
