pub use crate::builder::CacheBuilder;
pub use crate::ds::{RecencyList, SlotId};
pub use crate::error::{CacheError, InvariantError};
pub use crate::key::{CacheKey, KeyArg, args_key, make_cache_key};
pub use crate::memoize::{CacheSource, CachedMethod, Memoized};
pub use crate::min_id::MinIdMap;
pub use crate::policy::bounded::{BoundedCache, OnMiss};
pub use crate::policy::lri::{Lri, LriCache};
pub use crate::policy::lru::{Lru, LruCache};
pub use crate::stats::CacheStats;
pub use crate::threshold_counter::ThresholdCounter;
pub use crate::traits::{ConcurrentCache, RecencyPolicy};
