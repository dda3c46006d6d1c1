//! Smallest-free integer IDs for shared objects.
//!
//! [`MinIdMap`] hands out `0, 1, 2, ...` to distinct [`Arc`] allocations and
//! always reuses the smallest released ID first. Objects are held through
//! [`Weak`] handles, so the map never keeps a value alive. IDs of dropped
//! objects are swept back into the free pool lazily: an allocation with no
//! free ID sweeps once the map has doubled since its last sweep, which keeps
//! allocation amortized O(1). [`reclaim`](MinIdMap::reclaim) sweeps on demand.
//!
//! ```
//! use std::sync::Arc;
//! use boundcache::min_id::MinIdMap;
//!
//! let mut ids = MinIdMap::new();
//! let a = Arc::new("a");
//! let b = Arc::new("b");
//! assert_eq!(ids.get(&a), 0);
//! assert_eq!(ids.get(&b), 1);
//!
//! drop(a);
//! let c = Arc::new("c");
//! assert_eq!(ids.get(&c), 0);
//! ```
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::{Arc, Weak};

use rustc_hash::FxHashMap;
use tracing::trace;

#[derive(Debug)]
struct Entry<T> {
    handle: Weak<T>,
    id: usize,
}

/// Allocation-address keyed map from live objects to minimal IDs.
#[derive(Debug)]
pub struct MinIdMap<T> {
    // A held `Weak` pins the allocation, so an address is never reused
    // while its entry is present.
    entries: FxHashMap<usize, Entry<T>>,
    free: BinaryHeap<Reverse<usize>>,
    // Entry count that triggers the next automatic sweep.
    sweep_at: usize,
}

fn address<T>(obj: &Arc<T>) -> usize {
    Arc::as_ptr(obj).cast::<()>().addr()
}

impl<T> MinIdMap<T> {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            free: BinaryHeap::new(),
            sweep_at: 0,
        }
    }

    /// Returns the ID of `obj`, allocating the smallest free one if needed.
    pub fn get(&mut self, obj: &Arc<T>) -> usize {
        let addr = address(obj);
        if let Some(entry) = self.entries.get(&addr) {
            return entry.id;
        }
        if self.free.is_empty() && self.entries.len() >= self.sweep_at {
            self.reclaim();
        }
        let id = match self.free.pop() {
            Some(Reverse(id)) => id,
            None => self.entries.len(),
        };
        self.entries.insert(
            addr,
            Entry {
                handle: Arc::downgrade(obj),
                id,
            },
        );
        id
    }

    /// Releases the ID of `obj`, returning it if one was assigned.
    pub fn drop_id(&mut self, obj: &Arc<T>) -> Option<usize> {
        let entry = self.entries.remove(&address(obj))?;
        self.free.push(Reverse(entry.id));
        Some(entry.id)
    }

    pub fn contains(&self, obj: &Arc<T>) -> bool {
        self.entries.contains_key(&address(obj))
    }

    /// Number of live objects holding an ID.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.handle.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live `(object, id)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Arc<T>, usize)> + '_ {
        self.entries
            .values()
            .filter_map(|entry| entry.handle.upgrade().map(|obj| (obj, entry.id)))
    }

    /// Returns IDs of dropped objects to the free pool; yields how many.
    pub fn reclaim(&mut self) -> usize {
        let before = self.entries.len();
        let free = &mut self.free;
        self.entries.retain(|_, entry| {
            let alive = entry.handle.strong_count() > 0;
            if !alive {
                free.push(Reverse(entry.id));
            }
            alive
        });
        let reclaimed = before - self.entries.len();
        self.sweep_at = self.entries.len().saturating_mul(2);
        if reclaimed > 0 {
            trace!(reclaimed, "reclaimed ids of dropped objects");
        }
        reclaimed
    }
}

impl<T> Default for MinIdMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
