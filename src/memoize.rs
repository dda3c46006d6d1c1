//! Memoization of functions and methods on top of bounded caches.
//!
//! ## Key Components
//!
//! - [`CacheSource`]: where the backing cache comes from, either a shared
//!   handle ([`CacheSource::Direct`]) or a factory resolved on every call
//!   ([`CacheSource::Factory`]).
//! - [`Memoized`]: wraps `Fn(&A) -> V`; results are stored under `key_fn(args)`.
//! - [`CachedMethod`]: wraps `Fn(&T, &A) -> V`; the cache is resolved from
//!   the receiver through an accessor, so every receiver can own its cache.
//!
//! ## Call Flow
//!
//! ```text
//!   call(args)
//!     1. cache = source.resolve()
//!     2. key   = key_fn(args)
//!     3. cache.get(key)        hit → return stored value
//!                              (a cache with on_miss fills itself here)
//!     4. KeyNotFound           → value = func(args); cache.insert(key, value)
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use boundcache::memoize::Memoized;
//! use boundcache::policy::lru::LruCache;
//!
//! let cache = Arc::new(LruCache::new(128).unwrap());
//! let slow_square = Memoized::new(Arc::clone(&cache), |n: &u64| n * n);
//!
//! assert_eq!(slow_square.call(&12), 144);
//! assert_eq!(slow_square.call(&12), 144);
//! assert_eq!(cache.hit_count(), 1);
//! ```
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::policy::bounded::BoundedCache;
use crate::policy::lru::Lru;
use crate::traits::RecencyPolicy;

type CacheFactory<K, V, P> = Arc<dyn Fn() -> Arc<BoundedCache<K, V, P>> + Send + Sync>;
type KeyFn<A, K> = Arc<dyn Fn(&A) -> K + Send + Sync>;

/// Origin of the cache used by a memoized callable.
pub enum CacheSource<K, V, P = Lru> {
    /// One cache shared by every call.
    Direct(Arc<BoundedCache<K, V, P>>),
    /// Produces the cache on each call.
    Factory(CacheFactory<K, V, P>),
}

impl<K, V, P> CacheSource<K, V, P> {
    pub fn factory<G>(factory: G) -> Self
    where
        G: Fn() -> Arc<BoundedCache<K, V, P>> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(factory))
    }

    /// Returns the cache to use for the current call.
    pub fn resolve(&self) -> Arc<BoundedCache<K, V, P>> {
        match self {
            Self::Direct(cache) => Arc::clone(cache),
            Self::Factory(factory) => factory(),
        }
    }
}

impl<K, V, P> Clone for CacheSource<K, V, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Direct(cache) => Self::Direct(Arc::clone(cache)),
            Self::Factory(factory) => Self::Factory(Arc::clone(factory)),
        }
    }
}

impl<K, V, P> From<Arc<BoundedCache<K, V, P>>> for CacheSource<K, V, P> {
    fn from(cache: Arc<BoundedCache<K, V, P>>) -> Self {
        Self::Direct(cache)
    }
}

impl<K, V, P> fmt::Debug for CacheSource<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("CacheSource::Direct"),
            Self::Factory(_) => f.write_str("CacheSource::Factory"),
        }
    }
}

fn lookup_or_compute<K, V, P>(cache: &BoundedCache<K, V, P>, key: K, compute: impl FnOnce() -> V) -> V
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: RecencyPolicy,
{
    match cache.get(&key) {
        Ok(value) => value,
        Err(_) => {
            let value = compute();
            cache.insert(key, value.clone());
            value
        },
    }
}

/// Memoized free function.
pub struct Memoized<A, K, V, F, P = Lru> {
    source: CacheSource<K, V, P>,
    key_fn: KeyFn<A, K>,
    func: F,
}

impl<K, V, F, P> Memoized<K, K, V, F, P>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone,
    F: Fn(&K) -> V,
    P: RecencyPolicy,
{
    /// Memoizes `func`, using its argument as the cache key.
    pub fn new(source: impl Into<CacheSource<K, V, P>>, func: F) -> Self {
        Self {
            source: source.into(),
            key_fn: Arc::new(K::clone),
            func,
        }
    }
}

impl<A, K, V, F, P> Memoized<A, K, V, F, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(&A) -> V,
    P: RecencyPolicy,
{
    /// Memoizes `func`, storing results under `key_fn(args)`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use boundcache::key::{args_key, CacheKey, KeyArg};
    /// use boundcache::memoize::Memoized;
    /// use boundcache::policy::lri::LriCache;
    ///
    /// let cache: Arc<LriCache<CacheKey, String>> = Arc::new(LriCache::new(32).unwrap());
    /// let greet = Memoized::with_key(
    ///     cache,
    ///     |args: &(String, i64)| args_key([KeyArg::from(args.0.as_str()), KeyArg::from(args.1)], true),
    ///     |args: &(String, i64)| format!("{} #{}", args.0, args.1),
    /// );
    /// assert_eq!(greet.call(&("ada".to_string(), 1)), "ada #1");
    /// ```
    pub fn with_key<KF>(source: impl Into<CacheSource<K, V, P>>, key_fn: KF, func: F) -> Self
    where
        KF: Fn(&A) -> K + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            key_fn: Arc::new(key_fn),
            func,
        }
    }

    /// Returns the cached result for `args`, computing it on a miss.
    pub fn call(&self, args: &A) -> V {
        let cache = self.source.resolve();
        let key = (self.key_fn)(args);
        lookup_or_compute(&cache, key, || (self.func)(args))
    }

    /// Resolves the cache the next call would use.
    pub fn cache(&self) -> Arc<BoundedCache<K, V, P>> {
        self.source.resolve()
    }
}

impl<A, K, V, F, P> fmt::Debug for Memoized<A, K, V, F, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Memoized method whose cache lives on the receiver.
///
/// # Example
///
/// ```
/// use boundcache::memoize::CachedMethod;
/// use boundcache::policy::lru::LruCache;
///
/// struct Pricer {
///     markup: u64,
///     cache: LruCache<u64, u64>,
/// }
///
/// fn price_cache(p: &Pricer) -> &LruCache<u64, u64> {
///     &p.cache
/// }
///
/// let price = CachedMethod::new(price_cache, |p: &Pricer, base: &u64| base + p.markup);
/// let cheap = Pricer { markup: 1, cache: LruCache::new(8).unwrap() };
/// let dear = Pricer { markup: 50, cache: LruCache::new(8).unwrap() };
///
/// assert_eq!(price.call(&cheap, &10), 11);
/// assert_eq!(price.call(&dear, &10), 60);
/// assert_eq!(cheap.cache.len(), 1);
/// ```
pub struct CachedMethod<T, A, K, V, F, P = Lru> {
    accessor: fn(&T) -> &BoundedCache<K, V, P>,
    key_fn: KeyFn<A, K>,
    func: F,
}

impl<T, K, V, F, P> CachedMethod<T, K, K, V, F, P>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone,
    F: Fn(&T, &K) -> V,
    P: RecencyPolicy,
{
    pub fn new(accessor: fn(&T) -> &BoundedCache<K, V, P>, func: F) -> Self {
        Self {
            accessor,
            key_fn: Arc::new(K::clone),
            func,
        }
    }
}

impl<T, A, K, V, F, P> CachedMethod<T, A, K, V, F, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(&T, &A) -> V,
    P: RecencyPolicy,
{
    pub fn with_key<KF>(accessor: fn(&T) -> &BoundedCache<K, V, P>, key_fn: KF, func: F) -> Self
    where
        KF: Fn(&A) -> K + Send + Sync + 'static,
    {
        Self {
            accessor,
            key_fn: Arc::new(key_fn),
            func,
        }
    }

    /// Returns the cached result for `args` on `receiver`, computing it on a miss.
    pub fn call(&self, receiver: &T, args: &A) -> V {
        let cache = (self.accessor)(receiver);
        let key = (self.key_fn)(args);
        lookup_or_compute(cache, key, || (self.func)(receiver, args))
    }
}

impl<T, A, K, V, F, P> fmt::Debug for CachedMethod<T, A, K, V, F, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedMethod").finish_non_exhaustive()
    }
}
