mod link_arena;
pub mod recency_list;

pub(crate) use link_arena::PREALLOC_LIMIT;
pub use link_arena::SlotId;
pub use recency_list::{RecencyIter, RecencyList};
