//! # Bounded Cache Engine
//!
//! Fixed-capacity, thread-safe associative container shared by the LRI and
//! LRU policies. Values live in a hash store; recency lives in a
//! [`RecencyList`] ring whose index mirrors the store's key set. One
//! `parking_lot::Mutex` guards both structures plus the read counters.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                     BoundedCache<K, V, P>                            │
//!   │                                                                      │
//!   │   max_size: usize          on_miss: Option<Arc<dyn Fn(&K) -> V>>     │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │                  Mutex<CacheState<K, V>>                     │   │
//!   │   │                                                              │   │
//!   │   │   store: FxHashMap<K, V>         (values)                    │   │
//!   │   │   links: RecencyList<K>          (order + key → SlotId)      │   │
//!   │   │   hit_count / miss_count / soft_miss_count                   │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Insert Flow
//!
//! ```text
//!   insert(k, v)
//!     ├── k tracked          → replace value, move k to front
//!     ├── len < max_size     → add_front(k), store k → v
//!     └── len == max_size    → evict_and_reuse(k) yields victim,
//!                              store k → v, remove victim, return it
//! ```
//!
//! ## Read Counters
//!
//! | Method                   | Hit          | Miss, no `on_miss`        | Miss, `on_miss`        |
//! |--------------------------|--------------|---------------------------|------------------------|
//! | `get`                    | `hit += 1`   | `miss += 1`, `KeyNotFound`| `miss += 1`, fill      |
//! | `get_opt` / `get_or`     | `hit += 1`   | `miss += 1`, `soft += 1`  | `miss += 1`, fill      |
//! | `set_default`            | `hit += 1`   | `miss += 1`, `soft += 1`, insert default | `miss += 1`, fill |
//! | `peek` / `pop` / `contains` | -         | -                         | -                      |
//!
//! ## On-miss and the lock
//!
//! `parking_lot` mutexes are not reentrant. The `on_miss` producer therefore
//! runs with the lock released and its result is committed through
//! [`BoundedCache::insert`] under a fresh lock hold. The producer may call
//! back into the same cache. A concurrent writer can land the same key in
//! between; the produced value then overwrites it.
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::ds::{PREALLOC_LIMIT, RecencyList};
use crate::error::{CacheError, InvariantError};
use crate::policy::lri::Lri;
use crate::stats::CacheStats;
use crate::traits::{ConcurrentCache, RecencyPolicy};

/// Shared value producer invoked with the missing key.
pub type OnMiss<K, V> = Arc<dyn Fn(&K) -> V + Send + Sync>;

struct CacheState<K, V> {
    store: FxHashMap<K, V>,
    links: RecencyList<K>,
    hit_count: u64,
    miss_count: u64,
    soft_miss_count: u64,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new(max_size: usize) -> Self {
        Self {
            store: FxHashMap::with_capacity_and_hasher(
                max_size.min(PREALLOC_LIMIT),
                Default::default(),
            ),
            links: RecencyList::with_capacity(max_size),
            hit_count: 0,
            miss_count: 0,
            soft_miss_count: 0,
        }
    }

    fn insert(&mut self, key: K, value: V, max_size: usize) -> Option<(K, V)> {
        if let Some(slot) = self.store.get_mut(&key) {
            *slot = value;
            let promoted = self.links.move_to_front(&key);
            debug_assert!(promoted.is_ok(), "store and recency index out of sync");
            return None;
        }

        if self.store.len() < max_size {
            self.links.add_front(key.clone());
            self.store.insert(key, value);
            return None;
        }

        let victim = self.links.evict_and_reuse(key.clone());
        self.store.insert(key, value);
        let victim = victim?;
        let evicted = self.store.remove(&victim)?;
        Some((victim, evicted))
    }

    fn hit(&mut self, key: &K, promote: bool) -> Option<V>
    where
        V: Clone,
    {
        let value = self.store.get(key)?.clone();
        if promote {
            let promoted = self.links.move_to_front(key);
            debug_assert!(promoted.is_ok(), "store and recency index out of sync");
        }
        self.hit_count += 1;
        Some(value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.store.remove(key)?;
        let unlinked = self.links.remove(key);
        debug_assert!(unlinked.is_ok(), "store and recency index out of sync");
        Some(value)
    }

    fn items(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.links
            .iter()
            .filter_map(|key| self.store.get(key).map(|value| (key.clone(), value.clone())))
            .collect()
    }
}

/// Size-bounded cache whose eviction order is decided by the policy `P`.
///
/// Use the [`LriCache`](crate::policy::lri::LriCache) and
/// [`LruCache`](crate::policy::lru::LruCache) aliases rather than naming
/// `P` directly. All methods take `&self`; the cache is internally locked and
/// can be shared behind an `Arc`.
///
/// # Example
///
/// ```
/// use boundcache::policy::lru::LruCache;
///
/// let cache: LruCache<&str, u32> = LruCache::new(2).unwrap();
/// cache.insert("a", 1);
/// cache.insert("b", 2);
///
/// // reading "a" makes "b" the least recently used entry
/// assert_eq!(cache.get(&"a"), Ok(1));
/// assert_eq!(cache.insert("c", 3), Some(("b", 2)));
/// ```
pub struct BoundedCache<K, V, P = Lri> {
    max_size: usize,
    on_miss: Option<OnMiss<K, V>>,
    state: Mutex<CacheState<K, V>>,
    _policy: PhantomData<fn() -> P>,
}

impl<K, V, P> BoundedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    P: RecencyPolicy,
{
    /// Creates an empty cache holding at most `max_size` entries.
    ///
    /// Fails with [`CacheError::InvalidArgument`] when `max_size` is zero.
    pub fn new(max_size: usize) -> Result<Self, CacheError> {
        Self::from_parts(max_size, None, std::iter::empty())
    }

    /// Creates an empty cache that fills misses from `on_miss`.
    ///
    /// # Example
    ///
    /// ```
    /// use boundcache::policy::lri::LriCache;
    ///
    /// let squares: LriCache<u64, u64> = LriCache::with_on_miss(16, |k: &u64| k * k).unwrap();
    /// assert_eq!(squares.get(&9), Ok(81));
    /// assert!(squares.contains(&9));
    /// assert_eq!(squares.miss_count(), 1);
    /// ```
    pub fn with_on_miss<F>(max_size: usize, on_miss: F) -> Result<Self, CacheError>
    where
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        Self::from_parts(max_size, Some(Arc::new(on_miss)), std::iter::empty())
    }

    /// Creates a cache pre-loaded with `values`, inserted in iteration order.
    pub fn with_values<I>(max_size: usize, values: I) -> Result<Self, CacheError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_parts(max_size, None, values)
    }

    pub(crate) fn from_parts<I>(
        max_size: usize,
        on_miss: Option<OnMiss<K, V>>,
        values: I,
    ) -> Result<Self, CacheError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        if max_size == 0 {
            warn!(policy = P::NAME, "rejected cache with max_size 0");
            return Err(CacheError::invalid("max_size must be greater than zero"));
        }
        let mut state = CacheState::new(max_size);
        for (key, value) in values {
            state.insert(key, value, max_size);
        }
        Ok(Self {
            max_size,
            on_miss,
            state: Mutex::new(state),
            _policy: PhantomData,
        })
    }

    /// Returns the configured maximum number of entries.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns `true` if misses are filled by an `on_miss` producer.
    #[inline]
    pub fn has_on_miss(&self) -> bool {
        self.on_miss.is_some()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.state.lock().store.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is present. Counters and order are untouched.
    pub fn contains(&self, key: &K) -> bool {
        self.state.lock().store.contains_key(key)
    }

    pub fn hit_count(&self) -> u64 {
        self.state.lock().hit_count
    }

    pub fn miss_count(&self) -> u64 {
        self.state.lock().miss_count
    }

    pub fn soft_miss_count(&self) -> u64 {
        self.state.lock().soft_miss_count
    }

    /// Captures counters and size under one lock hold.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hit_count: state.hit_count,
            miss_count: state.miss_count,
            soft_miss_count: state.soft_miss_count,
            len: state.store.len(),
            max_size: self.max_size,
        }
    }

    /// Inserts or overwrites `key`, moving it to the most-recent end.
    ///
    /// Returns the entry evicted to make room, if any. Overwriting a present
    /// key never evicts.
    pub fn insert(&self, key: K, value: V) -> Option<(K, V)> {
        let mut state = self.state.lock();
        let evicted = state.insert(key, value, self.max_size);
        if evicted.is_some() {
            trace!(policy = P::NAME, max_size = self.max_size, "evicted least recent entry");
        }
        evicted
    }

    /// Inserts every pair in order under a single lock hold.
    pub fn update<I>(&self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut state = self.state.lock();
        for (key, value) in values {
            state.insert(key, value, self.max_size);
        }
    }

    /// Removes `key`, failing with [`CacheError::KeyNotFound`] if absent.
    pub fn delete(&self, key: &K) -> Result<(), CacheError> {
        self.pop(key).map(drop)
    }

    /// Removes and returns the value for `key`. Counters are not touched.
    pub fn pop(&self, key: &K) -> Result<V, CacheError> {
        self.state.lock().remove(key).ok_or(CacheError::KeyNotFound)
    }

    /// Like [`pop`](Self::pop) but yields `default` when `key` is absent.
    pub fn pop_or(&self, key: &K, default: V) -> V {
        self.pop(key).unwrap_or(default)
    }

    /// Removes and returns the least recent entry.
    ///
    /// Fails with [`CacheError::KeyNotFound`] when the cache is empty.
    pub fn pop_item(&self) -> Result<(K, V), CacheError> {
        let mut state = self.state.lock();
        let key = state.links.pop_lru().ok_or(CacheError::KeyNotFound)?;
        let value = state.store.remove(&key).ok_or(CacheError::KeyNotFound)?;
        Ok((key, value))
    }

    /// Drops every entry. `max_size`, `on_miss` and counters are kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let dropped = state.store.len();
        state.store.clear();
        state.links.clear();
        debug!(policy = P::NAME, dropped, "cache cleared");
    }

    /// Verifies that the store, the index and the recency ring agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let state = self.state.lock();
        state.links.check_invariants()?;
        if state.store.len() != state.links.len() {
            return Err(InvariantError::new(format!(
                "store has {} entries, recency list has {}",
                state.store.len(),
                state.links.len()
            )));
        }
        if state.store.len() > self.max_size {
            return Err(InvariantError::new("store exceeds max_size"));
        }
        if state.links.iter().any(|key| !state.store.contains_key(key)) {
            return Err(InvariantError::new("recency list tracks a key missing from the store"));
        }
        if state.soft_miss_count > state.miss_count {
            return Err(InvariantError::new("soft_miss_count exceeds miss_count"));
        }
        Ok(())
    }
}

impl<K, V, P> BoundedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: RecencyPolicy,
{
    /// Returns the value for `key`.
    ///
    /// A hit bumps `hit_count` (and promotes under LRU). A miss bumps
    /// `miss_count`, then either fills from `on_miss` or fails with
    /// [`CacheError::KeyNotFound`].
    pub fn get(&self, key: &K) -> Result<V, CacheError> {
        let on_miss = {
            let mut state = self.state.lock();
            if let Some(value) = state.hit(key, P::PROMOTE_ON_READ) {
                return Ok(value);
            }
            state.miss_count += 1;
            match &self.on_miss {
                Some(on_miss) => Arc::clone(on_miss),
                None => return Err(CacheError::KeyNotFound),
            }
        };
        Ok(self.fill(key, &on_miss))
    }

    /// Returns the value for `key`, or `None` on a soft miss.
    ///
    /// Without `on_miss`, a miss bumps both `miss_count` and
    /// `soft_miss_count`. With `on_miss`, a miss is filled like [`get`](Self::get).
    pub fn get_opt(&self, key: &K) -> Option<V> {
        let on_miss = {
            let mut state = self.state.lock();
            if let Some(value) = state.hit(key, P::PROMOTE_ON_READ) {
                return Some(value);
            }
            state.miss_count += 1;
            match &self.on_miss {
                Some(on_miss) => Arc::clone(on_miss),
                None => {
                    state.soft_miss_count += 1;
                    return None;
                },
            }
        };
        Some(self.fill(key, &on_miss))
    }

    /// Returns the value for `key`, or `default` on a soft miss.
    pub fn get_or(&self, key: &K, default: V) -> V {
        self.get_opt(key).unwrap_or(default)
    }

    /// Returns the value for `key` without touching counters or order.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.state.lock().store.get(key).cloned()
    }

    /// Returns the value for `key`, inserting `default` on a soft miss.
    ///
    /// # Example
    ///
    /// ```
    /// use boundcache::policy::lri::LriCache;
    ///
    /// let cache: LriCache<&str, Vec<u8>> = LriCache::new(4).unwrap();
    /// assert_eq!(cache.set_default("k", vec![1]), vec![1]);
    /// assert_eq!(cache.set_default("k", vec![2]), vec![1]);
    /// assert_eq!(cache.soft_miss_count(), 1);
    /// assert_eq!(cache.hit_count(), 1);
    /// ```
    pub fn set_default(&self, key: K, default: V) -> V {
        let on_miss = {
            let mut state = self.state.lock();
            if let Some(value) = state.hit(&key, P::PROMOTE_ON_READ) {
                return value;
            }
            state.miss_count += 1;
            match &self.on_miss {
                Some(on_miss) => Arc::clone(on_miss),
                None => {
                    state.soft_miss_count += 1;
                    state.insert(key, default.clone(), self.max_size);
                    return default;
                },
            }
        };
        self.fill(&key, &on_miss)
    }

    /// Returns the keys from least to most recent.
    pub fn keys(&self) -> Vec<K> {
        self.state.lock().links.iter().cloned().collect()
    }

    /// Returns the entries from least to most recent.
    pub fn items(&self) -> Vec<(K, V)> {
        self.state.lock().items()
    }

    /// Returns an independent cache with the same `max_size`, `on_miss` and
    /// contents. Eviction order is preserved; counters start at zero.
    pub fn copy(&self) -> Self {
        let items = self.items();
        let mut state = CacheState::new(self.max_size);
        for (key, value) in items {
            state.insert(key, value, self.max_size);
        }
        Self {
            max_size: self.max_size,
            on_miss: self.on_miss.clone(),
            state: Mutex::new(state),
            _policy: PhantomData,
        }
    }

    /// Inserts every entry of `other`, least recent first.
    ///
    /// Merging a cache into itself is a no-op.
    pub fn merge_from<Q>(&self, other: &BoundedCache<K, V, Q>)
    where
        Q: RecencyPolicy,
    {
        if same_instance(self, other) {
            return;
        }
        let items = other.items();
        self.update(items);
    }

    fn fill(&self, key: &K, on_miss: &OnMiss<K, V>) -> V {
        let value = on_miss(key);
        let evicted = self.insert(key.clone(), value.clone());
        trace!(
            policy = P::NAME,
            evicted = evicted.is_some(),
            "filled miss from on_miss"
        );
        value
    }
}

fn same_instance<A, B>(a: &A, b: &B) -> bool {
    std::ptr::eq(a as *const A as *const (), b as *const B as *const ())
}

impl<K, V, P> Clone for BoundedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: RecencyPolicy,
{
    /// Same as [`BoundedCache::copy`]: counters of the clone start at zero.
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl<K, V, P, Q> PartialEq<BoundedCache<K, V, Q>> for BoundedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    V: PartialEq + Clone,
    P: RecencyPolicy,
    Q: RecencyPolicy,
{
    fn eq(&self, other: &BoundedCache<K, V, Q>) -> bool {
        if same_instance(self, other) {
            return true;
        }
        // Snapshot one side first so the two locks are never held together.
        let theirs = other.items();
        let state = self.state.lock();
        state.store.len() == theirs.len()
            && theirs
                .iter()
                .all(|(key, value)| state.store.get(key) == Some(value))
    }
}

impl<K, V, P, S> PartialEq<HashMap<K, V, S>> for BoundedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    V: PartialEq,
    P: RecencyPolicy,
    S: BuildHasher,
{
    fn eq(&self, other: &HashMap<K, V, S>) -> bool {
        let state = self.state.lock();
        state.store.len() == other.len()
            && other
                .iter()
                .all(|(key, value)| state.store.get(key) == Some(value))
    }
}

impl<K, V, P> Extend<(K, V)> for BoundedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    P: RecencyPolicy,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.update(iter);
    }
}

impl<K, V, P> fmt::Debug for BoundedCache<K, V, P>
where
    P: RecencyPolicy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedCache")
            .field("policy", &P::NAME)
            .field("len", &state.store.len())
            .field("max_size", &self.max_size)
            .field("hit_count", &state.hit_count)
            .field("miss_count", &state.miss_count)
            .field("soft_miss_count", &state.soft_miss_count)
            .field("on_miss", &self.on_miss.is_some())
            .finish_non_exhaustive()
    }
}

impl<K, V, P> ConcurrentCache for BoundedCache<K, V, P>
where
    K: Send,
    V: Send,
    P: RecencyPolicy,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::lri::LriCache;
    use crate::policy::lru::LruCache;

    // ==============================================
    // CONSTRUCTION
    // ==============================================
    mod construction {
        use super::*;

        #[test]
        fn zero_max_size_is_rejected() {
            let err = LriCache::<u32, u32>::new(0).unwrap_err();
            assert!(matches!(err, CacheError::InvalidArgument(_)));
            assert!(err.to_string().contains("max_size"));

            assert!(LruCache::<u32, u32>::with_on_miss(0, |k: &u32| *k).is_err());
        }

        #[test]
        fn initial_values_go_through_insert() {
            let cache: LriCache<u32, &str> =
                LriCache::with_values(2, [(1, "a"), (2, "b"), (3, "c")]).unwrap();
            assert_eq!(cache.len(), 2);
            assert!(!cache.contains(&1));
            assert_eq!(cache.keys(), vec![2, 3]);
            assert_eq!(cache.stats(), CacheStats { len: 2, max_size: 2, ..Default::default() });
        }

        #[test]
        fn huge_max_size_allocates_lazily() {
            let cache: LriCache<u64, u64> = LriCache::new(usize::MAX).unwrap();
            assert_eq!(cache.insert(1, 1), None);
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.max_size(), usize::MAX);

            let copy = cache.copy();
            assert_eq!(copy.get(&1), Ok(1));
            cache.clear();
            cache.insert(2, 2);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn debug_reports_policy_and_size() {
            let cache: LruCache<u32, u32> = LruCache::new(3).unwrap();
            cache.insert(1, 1);
            let dbg = format!("{cache:?}");
            assert!(dbg.contains("LRU"));
            assert!(dbg.contains("max_size: 3"));
        }
    }

    // ==============================================
    // INSERT / EVICTION
    // ==============================================
    mod insert {
        use super::*;

        #[test]
        fn single_slot_cache_replaces_entry() {
            let cache: LriCache<&str, i32> = LriCache::new(1).unwrap();
            assert_eq!(cache.insert("x", 1), None);
            assert_eq!(cache.insert("y", 2), Some(("x", 1)));
            assert_eq!(cache.len(), 1);
            assert!(!cache.contains(&"x"));
            assert!(cache.contains(&"y"));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn overwrite_keeps_len_and_promotes() {
            let cache: LriCache<u32, u32> = LriCache::new(3).unwrap();
            for k in 0..3 {
                cache.insert(k, k);
            }
            assert_eq!(cache.insert(0, 100), None);
            assert_eq!(cache.len(), 3);
            assert_eq!(cache.keys(), vec![1, 2, 0]);
            assert_eq!(cache.insert(3, 3), Some((1, 1)));
            assert_eq!(cache.peek(&0), Some(100));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn churn_keeps_capacity() {
            let cache: LruCache<u64, u64> = LruCache::new(8).unwrap();
            for i in 0..1_000 {
                cache.insert(i, i * 2);
                assert!(cache.len() <= 8);
            }
            assert_eq!(cache.keys(), (992..1_000).collect::<Vec<_>>());
            cache.check_invariants().unwrap();
        }

        #[test]
        fn update_and_extend() {
            let mut cache: LriCache<u32, u32> = LriCache::new(4).unwrap();
            cache.update([(1, 1), (2, 2)]);
            cache.extend([(3, 3), (4, 4), (5, 5)]);
            assert_eq!(cache.keys(), vec![2, 3, 4, 5]);
        }
    }

    // ==============================================
    // READS AND COUNTERS
    // ==============================================
    mod reads {
        use super::*;

        #[test]
        fn get_missing_without_on_miss_fails() {
            let cache: LriCache<u32, u32> = LriCache::new(2).unwrap();
            assert_eq!(cache.get(&1), Err(CacheError::KeyNotFound));
            assert_eq!(cache.miss_count(), 1);
            assert_eq!(cache.soft_miss_count(), 0);
        }

        #[test]
        fn get_opt_counts_soft_and_hard_miss() {
            let cache: LriCache<u32, u32> = LriCache::new(2).unwrap();
            assert_eq!(cache.get_opt(&1), None);
            assert_eq!(cache.get_or(&1, 9), 9);
            assert_eq!(cache.miss_count(), 2);
            assert_eq!(cache.soft_miss_count(), 2);
            assert!(cache.is_empty());
        }

        #[test]
        fn on_miss_fills_and_is_not_soft() {
            let cache: LriCache<u32, String> =
                LriCache::with_on_miss(2, |k: &u32| format!("v{k}")).unwrap();
            assert_eq!(cache.get_opt(&1), Some("v1".to_string()));
            assert_eq!(cache.get(&2), Ok("v2".to_string()));
            assert_eq!(cache.get(&1), Ok("v1".to_string()));
            let stats = cache.stats();
            assert_eq!(stats.miss_count, 2);
            assert_eq!(stats.soft_miss_count, 0);
            assert_eq!(stats.hit_count, 1);
            assert_eq!(stats.len, 2);
        }

        #[test]
        fn on_miss_may_reenter_cache() {
            let cache: Arc<LriCache<u32, u32>> = Arc::new(LriCache::new(4).unwrap());
            let inner = Arc::clone(&cache);
            let outer: LriCache<u32, u32> = LriCache::with_on_miss(4, move |k: &u32| {
                inner.insert(*k, *k);
                inner.len() as u32
            })
            .unwrap();
            assert_eq!(outer.get(&7), Ok(1));
            assert!(cache.contains(&7));
        }

        #[test]
        fn on_miss_reading_own_cache_does_not_deadlock() {
            use std::sync::OnceLock;

            static CACHE: OnceLock<LruCache<u32, u32>> = OnceLock::new();
            let cache = CACHE.get_or_init(|| {
                LruCache::with_on_miss(4, |k: &u32| {
                    let below = if *k == 0 {
                        0
                    } else {
                        CACHE.get().and_then(|c| c.get(&(k - 1)).ok()).unwrap_or(0)
                    };
                    below + k
                })
                .unwrap()
            });
            // triangular numbers through recursive fills
            assert_eq!(cache.get(&3), Ok(6));
            assert!(cache.len() <= 4);
        }

        #[test]
        fn peek_and_contains_touch_nothing() {
            let cache: LruCache<u32, u32> = LruCache::new(2).unwrap();
            cache.insert(1, 10);
            cache.insert(2, 20);
            assert_eq!(cache.peek(&1), Some(10));
            assert!(cache.contains(&1));
            assert_eq!(cache.peek(&3), None);
            assert_eq!(cache.keys(), vec![1, 2]);
            assert_eq!(cache.stats().lookups(), 0);
        }

        #[test]
        fn set_default_inserts_once() {
            let cache: LriCache<&str, u32> = LriCache::new(2).unwrap();
            assert_eq!(cache.set_default("a", 1), 1);
            assert_eq!(cache.set_default("a", 2), 1);
            assert_eq!(cache.peek(&"a"), Some(1));
            assert_eq!(cache.miss_count(), 1);
            assert_eq!(cache.soft_miss_count(), 1);
            assert_eq!(cache.hit_count(), 1);
        }

        #[test]
        fn set_default_with_on_miss_uses_producer() {
            let cache: LriCache<u32, u32> = LriCache::with_on_miss(2, |k: &u32| k + 100).unwrap();
            assert_eq!(cache.set_default(1, 0), 101);
            assert_eq!(cache.soft_miss_count(), 0);
            assert_eq!(cache.miss_count(), 1);
        }
    }

    // ==============================================
    // REMOVAL
    // ==============================================
    mod removal {
        use super::*;

        #[test]
        fn delete_and_pop() {
            let cache: LriCache<u32, u32> = LriCache::new(3).unwrap();
            cache.update([(1, 10), (2, 20), (3, 30)]);

            cache.delete(&2).unwrap();
            assert_eq!(cache.delete(&2), Err(CacheError::KeyNotFound));
            assert_eq!(cache.pop(&1), Ok(10));
            assert_eq!(cache.pop(&1), Err(CacheError::KeyNotFound));
            assert_eq!(cache.pop_or(&1, 0), 0);
            assert_eq!(cache.keys(), vec![3]);
            assert_eq!(cache.stats().lookups(), 0);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn freed_slot_is_reused_without_eviction() {
            let cache: LriCache<u32, u32> = LriCache::new(2).unwrap();
            cache.insert(1, 1);
            cache.insert(2, 2);
            cache.delete(&1).unwrap();
            assert_eq!(cache.insert(3, 3), None);
            assert_eq!(cache.keys(), vec![2, 3]);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn pop_item_takes_least_recent() {
            let cache: LruCache<u32, u32> = LruCache::new(3).unwrap();
            cache.update([(1, 1), (2, 2), (3, 3)]);
            cache.get(&1).unwrap();
            assert_eq!(cache.pop_item(), Ok((2, 2)));
            assert_eq!(cache.pop_item(), Ok((3, 3)));
            assert_eq!(cache.pop_item(), Ok((1, 1)));
            assert_eq!(cache.pop_item(), Err(CacheError::KeyNotFound));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn clear_keeps_counters_and_config() {
            let cache: LriCache<u32, u32> = LriCache::with_on_miss(2, |k: &u32| *k).unwrap();
            cache.get(&1).unwrap();
            cache.get(&1).unwrap();
            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.max_size(), 2);
            assert!(cache.has_on_miss());
            assert_eq!(cache.hit_count(), 1);
            assert_eq!(cache.miss_count(), 1);
            cache.insert(5, 5);
            cache.check_invariants().unwrap();
        }
    }

    // ==============================================
    // COPY / MERGE / EQUALITY
    // ==============================================
    mod copy_and_eq {
        use super::*;

        #[test]
        fn copy_is_independent() {
            let original: LriCache<&str, u32> = LriCache::new(3).unwrap();
            original.update([("a", 1), ("b", 2)]);
            original.get(&"a").unwrap();

            let copy = original.copy();
            assert_eq!(copy, original);
            assert_eq!(copy.hit_count(), 0);
            assert_eq!(copy.keys(), original.keys());

            copy.insert("c", 3);
            original.delete(&"a").unwrap();
            assert!(copy.contains(&"a"));
            assert!(!original.contains(&"c"));
            assert_ne!(copy, original);
        }

        #[test]
        fn clone_preserves_on_miss() {
            let cache: LruCache<u32, u32> = LruCache::with_on_miss(2, |k: &u32| k * 3).unwrap();
            let clone = cache.clone();
            assert_eq!(clone.get(&2), Ok(6));
            assert!(!cache.contains(&2));
        }

        #[test]
        fn merge_from_other_and_self() {
            let a: LriCache<u32, u32> = LriCache::new(4).unwrap();
            let b: LruCache<u32, u32> = LruCache::new(4).unwrap();
            a.update([(1, 1), (2, 2)]);
            b.update([(2, 20), (3, 30)]);

            a.merge_from(&b);
            assert_eq!(a.keys(), vec![1, 2, 3]);
            assert_eq!(a.peek(&2), Some(20));

            a.merge_from(&a);
            assert_eq!(a.keys(), vec![1, 2, 3]);
            a.check_invariants().unwrap();
        }

        #[test]
        fn equality_ignores_order_and_policy() {
            let lri: LriCache<u32, u32> = LriCache::new(4).unwrap();
            let lru: LruCache<u32, u32> = LruCache::new(8).unwrap();
            lri.update([(1, 1), (2, 2)]);
            lru.update([(2, 2), (1, 1)]);
            assert!(lri == lru);

            let map: HashMap<u32, u32> = [(1, 1), (2, 2)].into_iter().collect();
            assert!(lri == map);
            lri.insert(2, 3);
            assert!(lri != map);
            assert!(lri != lru);
        }
    }
}
