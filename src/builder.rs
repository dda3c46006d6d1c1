//! Configuration layer for bounded caches.
//!
//! Collects the maximum size, an optional `on_miss` producer and optional
//! initial entries, then builds a cache for any recency policy. The policy
//! is picked by type parameter, so the same builder yields LRI or LRU caches.
//!
//! ## Example
//!
//! ```rust
//! use boundcache::builder::CacheBuilder;
//! use boundcache::policy::{Lri, Lru};
//!
//! let lru = CacheBuilder::new(100)
//!     .values([(1u64, "one".to_string())])
//!     .try_build::<Lru>()
//!     .unwrap();
//! assert_eq!(lru.get(&1), Ok("one".to_string()));
//!
//! let lri = CacheBuilder::new(100)
//!     .on_miss(|k: &u64| k.to_string())
//!     .try_build::<Lri>()
//!     .unwrap();
//! assert_eq!(lri.get(&7), Ok("7".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::CacheError;
use crate::policy::bounded::{BoundedCache, OnMiss};
use crate::traits::RecencyPolicy;

/// Builder for [`BoundedCache`] instances.
pub struct CacheBuilder<K, V> {
    max_size: usize,
    on_miss: Option<OnMiss<K, V>>,
    values: Vec<(K, V)>,
}

impl<K, V> CacheBuilder<K, V> {
    /// Create a new cache builder with the specified maximum size.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            on_miss: None,
            values: Vec::new(),
        }
    }

    /// Fill misses by calling `on_miss` with the missing key.
    pub fn on_miss<F>(mut self, on_miss: F) -> Self
    where
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        self.on_miss = Some(Arc::new(on_miss));
        self
    }

    /// Pre-load entries; later entries win and may evict earlier ones.
    pub fn values<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.values.extend(values);
        self
    }

    /// Build a cache with policy `P`.
    ///
    /// Fails with [`CacheError::InvalidArgument`] when the maximum size is zero.
    pub fn try_build<P>(self) -> Result<BoundedCache<K, V, P>, CacheError>
    where
        K: Eq + Hash + Clone,
        P: RecencyPolicy,
    {
        BoundedCache::from_parts(self.max_size, self.on_miss, self.values)
    }
}

impl<K, V> fmt::Debug for CacheBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("max_size", &self.max_size)
            .field("on_miss", &self.on_miss.is_some())
            .field("values", &self.values.len())
            .finish()
    }
}
