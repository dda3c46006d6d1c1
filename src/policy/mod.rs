pub mod bounded;
pub mod lri;
pub mod lru;

pub use bounded::{BoundedCache, OnMiss};
pub use lri::{Lri, LriCache};
pub use lru::{Lru, LruCache};
