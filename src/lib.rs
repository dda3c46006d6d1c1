//! boundcache: bounded LRI/LRU caches, approximate frequency counting and
//! memoization helpers.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod ds;
pub mod error;
pub mod key;
pub mod memoize;
pub mod min_id;
pub mod policy;
pub mod prelude;
pub mod stats;
pub mod threshold_counter;
pub mod traits;

pub use crate::ds::{RecencyList, SlotId};
pub use crate::policy::{BoundedCache, LriCache, LruCache};
pub use crate::threshold_counter::ThresholdCounter;
