//! Sentinel-anchored circular recency list.
//!
//! Nodes live in a link arena and link to each other by `SlotId`. One node,
//! the *anchor*, carries no key and marks the boundary between the most- and
//! least-recently touched ends of the ring. A key index maps every tracked
//! key to its node for O(1) promotion and removal.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>            arena (LinkArena<K>)     
//!   ┌─────────┬─────────┐
//!   │  key A  │  id_1   │       ┌──────────────────────────────────────────┐
//!   │  key B  │  id_2   │       ▼                                          │
//!   │  key C  │  id_3   │    [anchor] ──► [A] ──► [B] ──► [C] ─────────────┘
//!   └─────────┴─────────┘     key: None   LRU              MRU
//!
//!   anchor.next = least recently touched (eviction victim)
//!   anchor.prev = most recently touched
//! ```
//!
//! ## Eviction by anchor rotation
//!
//! ```text
//!   evict_and_reuse(D) on a full ring:
//!
//!     Before:  [anchor] ─► [A] ─► [B] ─► [C] ─► (anchor)
//!
//!     1. anchor.key = D            (old anchor becomes the MRU entry)
//!     2. anchor     = A's node     (former LRU node becomes the anchor)
//!     3. evicted    = A, node key cleared
//!
//!     After:   [anchor'] ─► [B] ─► [C] ─► [D] ─► (anchor')
//! ```
//!
//! No node is allocated or freed on the full-capacity insert path.
//!
//! ## Performance
//! - `move_to_front` / `add_front` / `evict_and_reuse` / `remove`: O(1)
//! - `iter`: O(n), least recent first
//!
//! `check_invariants()` walks the ring and cross-checks the index.
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::link_arena::{LinkArena, PREALLOC_LIMIT, SlotId};
use crate::error::{CacheError, InvariantError};

/// Recency ring of keys with an O(1) key → node index.
#[derive(Debug, Clone)]
pub struct RecencyList<K> {
    arena: LinkArena<K>,
    index: FxHashMap<K, SlotId>,
    anchor: SlotId,
}

impl<K> RecencyList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty ring holding only the anchor.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty ring sized for `capacity` keys.
    ///
    /// At most 1024 nodes are reserved up front; the ring grows past that on
    /// demand, so any capacity is accepted.
    pub fn with_capacity(capacity: usize) -> Self {
        let (arena, anchor) = LinkArena::with_anchor(capacity);
        Self {
            arena,
            index: FxHashMap::with_capacity_and_hasher(
                capacity.min(PREALLOC_LIMIT),
                Default::default(),
            ),
            anchor,
        }
    }

    /// Returns the number of tracked keys (the anchor is not counted).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns `true` if `key` is tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the least recently touched key (the next eviction victim).
    pub fn lru_key(&self) -> Option<&K> {
        let next = self.arena.get(self.anchor)?.next;
        self.arena.get(next)?.key.as_ref()
    }

    /// Returns the most recently touched key.
    pub fn mru_key(&self) -> Option<&K> {
        let prev = self.arena.get(self.anchor)?.prev;
        self.arena.get(prev)?.key.as_ref()
    }

    /// Iterates keys from least to most recently touched.
    pub fn iter(&self) -> RecencyIter<'_, K> {
        let current = self
            .arena
            .get(self.anchor)
            .map_or(self.anchor, |link| link.next);
        RecencyIter {
            list: self,
            current,
            remaining: self.len(),
        }
    }

    /// Moves `key` to the most recent position.
    ///
    /// Fails with [`CacheError::KeyNotFound`] if `key` is not tracked.
    pub fn move_to_front(&mut self, key: &K) -> Result<SlotId, CacheError> {
        let id = *self.index.get(key).ok_or(CacheError::KeyNotFound)?;
        self.splice_to_front(id);
        Ok(id)
    }

    /// Links a new node for `key` at the most recent position.
    ///
    /// A key that is already tracked is promoted instead.
    pub fn add_front(&mut self, key: K) -> SlotId {
        if let Some(&id) = self.index.get(&key) {
            self.splice_to_front(id);
            return id;
        }
        let id = self.arena.alloc(self.anchor, self.anchor, key.clone());
        self.link_before_anchor(id);
        self.index.insert(key, id);
        id
    }

    /// Stores `key` in the anchor and rotates the anchor onto the least
    /// recent node, returning the key that node held.
    ///
    /// On an empty ring nothing can be evicted: the key is added and `None`
    /// is returned. A key that is already tracked is promoted instead.
    pub fn evict_and_reuse(&mut self, key: K) -> Option<K> {
        if self.index.is_empty() {
            self.add_front(key);
            return None;
        }
        if let Some(&id) = self.index.get(&key) {
            self.splice_to_front(id);
            return None;
        }

        let old_anchor = self.anchor;
        let new_anchor = self.arena.get(old_anchor)?.next;
        if let Some(link) = self.arena.get_mut(old_anchor) {
            link.key = Some(key.clone());
        }
        let evicted = self.arena.get_mut(new_anchor).and_then(|link| link.key.take());
        self.anchor = new_anchor;

        if let Some(evicted) = &evicted {
            self.index.remove(evicted);
        }
        self.index.insert(key, old_anchor);
        evicted
    }

    /// Unlinks and frees the node for `key`.
    ///
    /// Fails with [`CacheError::KeyNotFound`] if `key` is not tracked.
    pub fn remove(&mut self, key: &K) -> Result<(), CacheError> {
        let id = self.index.remove(key).ok_or(CacheError::KeyNotFound)?;
        self.unlink(id);
        self.arena.free(id);
        Ok(())
    }

    /// Removes and returns the least recently touched key.
    pub fn pop_lru(&mut self) -> Option<K> {
        let id = self.arena.get(self.anchor)?.next;
        if id == self.anchor {
            return None;
        }
        self.unlink(id);
        let key = self.arena.free(id)?.key?;
        self.index.remove(&key);
        Some(key)
    }

    /// Drops every key and resets the ring to a lone anchor.
    pub fn clear(&mut self) {
        self.index.clear();
        self.anchor = self.arena.reset();
    }

    /// Walks the ring and verifies links, anchor uniqueness and the index.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let anchor = self
            .arena
            .get(self.anchor)
            .ok_or_else(|| InvariantError::new("anchor node missing"))?;
        if anchor.key.is_some() {
            return Err(InvariantError::new("anchor carries a key"));
        }

        let mut count = 0usize;
        let mut prev = self.anchor;
        let mut current = anchor.next;
        while current != self.anchor {
            let link = self
                .arena
                .get(current)
                .ok_or_else(|| InvariantError::new("dangling next link"))?;
            if link.prev != prev {
                return Err(InvariantError::new("prev/next links disagree"));
            }
            let key = link
                .key
                .as_ref()
                .ok_or_else(|| InvariantError::new("second anchor found in ring"))?;
            if self.index.get(key) != Some(&current) {
                return Err(InvariantError::new("index does not point at ring node"));
            }
            count += 1;
            if count > self.index.len() {
                return Err(InvariantError::new("ring longer than index"));
            }
            prev = current;
            current = link.next;
        }
        if anchor.prev != prev {
            return Err(InvariantError::new("anchor.prev is not the last node"));
        }
        if count != self.index.len() {
            return Err(InvariantError::new(format!(
                "ring has {count} nodes, index has {}",
                self.index.len()
            )));
        }
        if self.arena.live() != count + 1 {
            return Err(InvariantError::new("arena holds unlinked nodes"));
        }
        Ok(())
    }

    fn splice_to_front(&mut self, id: SlotId) {
        let is_front = self
            .arena
            .get(self.anchor)
            .is_some_and(|anchor| anchor.prev == id);
        if !is_front {
            self.unlink(id);
            self.link_before_anchor(id);
        }
    }

    fn unlink(&mut self, id: SlotId) {
        let (prev, next) = match self.arena.get(id) {
            Some(link) => (link.prev, link.next),
            None => return,
        };
        if let Some(link) = self.arena.get_mut(prev) {
            link.next = next;
        }
        if let Some(link) = self.arena.get_mut(next) {
            link.prev = prev;
        }
    }

    fn link_before_anchor(&mut self, id: SlotId) {
        let anchor = self.anchor;
        let last = match self.arena.get(anchor) {
            Some(link) => link.prev,
            None => return,
        };
        if let Some(link) = self.arena.get_mut(id) {
            link.prev = last;
            link.next = anchor;
        }
        if let Some(link) = self.arena.get_mut(last) {
            link.next = id;
        }
        if let Some(link) = self.arena.get_mut(anchor) {
            link.prev = id;
        }
    }
}

impl<K> Default for RecencyList<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over keys from least to most recently touched.
pub struct RecencyIter<'a, K> {
    list: &'a RecencyList<K>,
    current: SlotId,
    remaining: usize,
}

impl<'a, K> Iterator for RecencyIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let link = self.list.arena.get(self.current)?;
        self.current = link.next;
        self.remaining -= 1;
        link.key.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
