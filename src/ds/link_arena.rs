//! Node storage for the recency ring.
//!
//! Every arena owns exactly one keyless anchor, created with the arena and
//! re-created by [`LinkArena::reset`]. Freed node slots are recycled, so a
//! cache churning at full capacity never grows the backing `Vec`.
//!
//! ```text
//!   links: Vec<Option<Link<K>>>
//!   ┌────────────┬────────────┬────────────┬────────────┐
//!   │ 0: anchor  │ 1: key A   │ 2: (freed) │ 3: key B   │
//!   └────────────┴────────────┴────────────┴────────────┘
//!   free: [2]     the next alloc lands in slot 2
//! ```
//!
//! The initial reservation is capped at [`PREALLOC_LIMIT`] nodes; larger
//! rings grow on demand.

/// Most nodes reserved up front, whatever capacity is requested.
pub(crate) const PREALLOC_LIMIT: usize = 1024;

/// Stable handle to a node of a recency ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) struct Link<K> {
    pub(crate) prev: SlotId,
    pub(crate) next: SlotId,
    // `None` only on the anchor.
    pub(crate) key: Option<K>,
}

#[derive(Debug, Clone)]
pub(crate) struct LinkArena<K> {
    links: Vec<Option<Link<K>>>,
    free: Vec<usize>,
    live: usize,
}

impl<K> LinkArena<K> {
    /// Creates an arena holding a self-linked anchor, sized for `capacity`
    /// keyed nodes up to [`PREALLOC_LIMIT`].
    pub(crate) fn with_anchor(capacity: usize) -> (Self, SlotId) {
        let reserve = capacity.min(PREALLOC_LIMIT).saturating_add(1);
        let mut arena = Self {
            links: Vec::with_capacity(reserve),
            free: Vec::new(),
            live: 0,
        };
        let anchor = arena.push_anchor();
        (arena, anchor)
    }

    /// Drops every node and returns the fresh anchor.
    pub(crate) fn reset(&mut self) -> SlotId {
        self.links.clear();
        self.free.clear();
        self.live = 0;
        self.push_anchor()
    }

    fn push_anchor(&mut self) -> SlotId {
        let id = SlotId(self.links.len());
        self.links.push(Some(Link {
            prev: id,
            next: id,
            key: None,
        }));
        self.live += 1;
        id
    }

    /// Stores a keyed node, reusing a freed slot when one is available.
    pub(crate) fn alloc(&mut self, prev: SlotId, next: SlotId, key: K) -> SlotId {
        let link = Some(Link {
            prev,
            next,
            key: Some(key),
        });
        let idx = match self.free.pop() {
            Some(idx) => {
                self.links[idx] = link;
                idx
            },
            None => {
                self.links.push(link);
                self.links.len() - 1
            },
        };
        self.live += 1;
        SlotId(idx)
    }

    pub(crate) fn free(&mut self, id: SlotId) -> Option<Link<K>> {
        let link = self.links.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.live -= 1;
        Some(link)
    }

    #[inline]
    pub(crate) fn get(&self, id: SlotId) -> Option<&Link<K>> {
        self.links.get(id.0).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: SlotId) -> Option<&mut Link<K>> {
        self.links.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Live nodes, the anchor included.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Slots ever allocated, live or free.
    pub(crate) fn allocated(&self) -> usize {
        self.links.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_is_self_linked() {
        let (arena, anchor) = LinkArena::<u32>::with_anchor(8);
        let link = arena.get(anchor).unwrap();
        assert_eq!((link.prev, link.next), (anchor, anchor));
        assert!(link.key.is_none());
        assert_eq!(arena.live(), 1);
    }

    #[test]
    fn freed_slot_is_reused() {
        let (mut arena, anchor) = LinkArena::with_anchor(4);
        let a = arena.alloc(anchor, anchor, "a");
        arena.alloc(anchor, anchor, "b");
        assert_eq!(arena.free(a).and_then(|link| link.key), Some("a"));
        assert!(arena.free(a).is_none());
        assert_eq!(arena.live(), 2);

        let c = arena.alloc(anchor, anchor, "c");
        assert_eq!(c, a);
        assert_eq!(arena.allocated(), 3);
        assert_eq!(arena.get(c).and_then(|link| link.key), Some("c"));
    }

    #[test]
    fn huge_capacity_reserves_only_the_limit() {
        let (arena, _) = LinkArena::<u64>::with_anchor(usize::MAX);
        assert!(arena.links.capacity() <= PREALLOC_LIMIT + 1);
    }

    #[test]
    fn reset_rebuilds_lone_anchor() {
        let (mut arena, anchor) = LinkArena::with_anchor(0);
        for key in 0..5 {
            arena.alloc(anchor, anchor, key);
        }
        let fresh = arena.reset();
        assert_eq!(arena.live(), 1);
        assert_eq!(arena.allocated(), 1);
        let link = arena.get_mut(fresh).unwrap();
        assert_eq!(link.next, fresh);
    }
}
