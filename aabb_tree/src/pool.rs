// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node arena with an intrusive free list.
//!
//! Every node lives in one contiguous `Vec` and is named by its index. Unused
//! slots are threaded into a singly linked free list through [`Kind::Free`], so
//! allocation and release are O(1); when the list runs dry the arena doubles.

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::types::Aabb;

/// Stable index of a node inside the pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    pub(crate) const fn new(i: usize) -> Self {
        Self(i)
    }

    pub(crate) const fn get(self) -> usize {
        self.0
    }
}

/// Role of a node. Exactly one holds at any time.
#[derive(Clone, Debug)]
pub(crate) enum Kind<P, const D: usize> {
    /// A stored object: its identifier and tight bound.
    Leaf { particle: P, tight: Aabb<D> },
    /// A branch point with exactly two children.
    Internal { children: [NodeIdx; 2] },
    /// An unused slot linking to the next unused one.
    Free { next: Option<NodeIdx> },
}

#[derive(Clone, Debug)]
pub(crate) struct Node<P, const D: usize> {
    /// Fattened bound for leaves, merge of the children for internal nodes.
    pub(crate) fat: Aabb<D>,
    pub(crate) parent: Option<NodeIdx>,
    /// Zero for leaves.
    pub(crate) height: u32,
    pub(crate) kind: Kind<P, D>,
}

impl<P, const D: usize> Node<P, D> {
    fn free(next: Option<NodeIdx>) -> Self {
        Self {
            fat: Aabb::new([0.0; D], [0.0; D]),
            parent: None,
            height: 0,
            kind: Kind::Free { next },
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::Leaf { .. })
    }

    pub(crate) fn children(&self) -> Option<[NodeIdx; 2]> {
        match self.kind {
            Kind::Internal { children } => Some(children),
            _ => None,
        }
    }
}

const MIN_CAPACITY: usize = 2;

#[derive(Clone)]
pub(crate) struct NodePool<P, const D: usize> {
    nodes: Vec<Node<P, D>>,
    free: Option<NodeIdx>,
    in_use: usize,
}

impl<P, const D: usize> NodePool<P, D> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut pool = Self {
            nodes: Vec::new(),
            free: None,
            in_use: 0,
        };
        pool.grow(capacity.max(MIN_CAPACITY));
        pool
    }

    /// Append `additional` free slots in front of the current free list and
    /// return the first of them.
    fn grow(&mut self, additional: usize) -> NodeIdx {
        let start = self.nodes.len();
        let end = start + additional;
        self.nodes.reserve_exact(additional);
        for i in start..end {
            let next = if i + 1 < end {
                Some(NodeIdx::new(i + 1))
            } else {
                self.free
            };
            self.nodes.push(Node::free(next));
        }
        let head = NodeIdx::new(start);
        self.free = Some(head);
        if start > 0 {
            tracing::debug!(from = start, to = end, "grew node pool");
        }
        head
    }

    /// Take a slot off the free list (growing the arena if it is empty) and fill it.
    pub(crate) fn allocate(
        &mut self,
        fat: Aabb<D>,
        parent: Option<NodeIdx>,
        height: u32,
        kind: Kind<P, D>,
    ) -> NodeIdx {
        let idx = match self.free {
            Some(idx) => idx,
            None => self.grow(self.nodes.len().max(MIN_CAPACITY)),
        };
        let slot = &mut self.nodes[idx.get()];
        let Kind::Free { next } = slot.kind else {
            unreachable!("free list head {idx:?} is not a free slot");
        };
        self.free = next;
        *slot = Node {
            fat,
            parent,
            height,
            kind,
        };
        self.in_use += 1;
        idx
    }

    /// Return a slot to the free list, handing back what it held.
    pub(crate) fn release(&mut self, idx: NodeIdx) -> Node<P, D> {
        let old = core::mem::replace(&mut self.nodes[idx.get()], Node::free(self.free));
        debug_assert!(
            !matches!(old.kind, Kind::Free { .. }),
            "double release of {idx:?}"
        );
        self.free = Some(idx);
        self.in_use -= 1;
        old
    }

    /// Mark every slot unused, keeping the capacity.
    pub(crate) fn clear(&mut self) {
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter_mut().enumerate() {
            let next = (i + 1 < len).then(|| NodeIdx::new(i + 1));
            *node = Node::free(next);
        }
        self.free = (len > 0).then(|| NodeIdx::new(0));
        self.in_use = 0;
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn in_use(&self) -> usize {
        self.in_use
    }

    pub(crate) fn free_head(&self) -> Option<NodeIdx> {
        self.free
    }

    /// Length of the free list, walked. Stops after `capacity + 1` hops so a
    /// cycle shows up as an over-long list instead of a hang.
    pub(crate) fn free_len(&self) -> usize {
        let mut len = 0;
        let mut cursor = self.free;
        while let Some(idx) = cursor {
            len += 1;
            if len > self.nodes.len() {
                break;
            }
            cursor = match self.nodes.get(idx.get()).map(|n| &n.kind) {
                Some(Kind::Free { next }) => *next,
                _ => None,
            };
        }
        len
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeIdx, &Node<P, D>)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeIdx::new(i), n))
    }
}

impl<P, const D: usize> Index<NodeIdx> for NodePool<P, D> {
    type Output = Node<P, D>;

    fn index(&self, idx: NodeIdx) -> &Self::Output {
        &self.nodes[idx.get()]
    }
}

impl<P, const D: usize> IndexMut<NodeIdx> for NodePool<P, D> {
    fn index_mut(&mut self, idx: NodeIdx) -> &mut Self::Output {
        &mut self.nodes[idx.get()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(particle: u32) -> Kind<u32, 1> {
        Kind::Leaf {
            particle,
            tight: Aabb::new([0.0], [1.0]),
        }
    }

    fn unit() -> Aabb<1> {
        Aabb::new([0.0], [1.0])
    }

    #[test]
    fn allocate_reuses_released_slots() {
        let mut pool: NodePool<u32, 1> = NodePool::with_capacity(4);
        let a = pool.allocate(unit(), None, 0, leaf(1));
        let b = pool.allocate(unit(), None, 0, leaf(2));
        assert_ne!(a, b);
        assert_eq!(pool.in_use(), 2);

        let old = pool.release(a);
        assert!(matches!(old.kind, Kind::Leaf { particle: 1, .. }));
        assert_eq!(pool.free_head(), Some(a));

        let c = pool.allocate(unit(), None, 0, leaf(3));
        assert_eq!(c, a, "most recently released slot is reused first");
        assert_eq!(pool.capacity(), 4);
    }

    #[test]
    fn grows_by_doubling_when_exhausted() {
        let mut pool: NodePool<u32, 1> = NodePool::with_capacity(2);
        for i in 0..2 {
            let _ = pool.allocate(unit(), None, 0, leaf(i));
        }
        assert_eq!(pool.free_len(), 0);
        let _ = pool.allocate(unit(), None, 0, leaf(2));
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.in_use(), 3);
        assert_eq!(pool.free_len(), 1);
        for i in 3..5 {
            let _ = pool.allocate(unit(), None, 0, leaf(i));
        }
        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.free_len() + pool.in_use(), pool.capacity());
    }

    #[test]
    fn clear_relinks_every_slot() {
        let mut pool: NodePool<u32, 1> = NodePool::with_capacity(3);
        let a = pool.allocate(unit(), None, 0, leaf(0));
        let _ = pool.allocate(unit(), Some(a), 0, leaf(1));
        pool.clear();
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.free_len(), 3);
        assert!(pool.iter().all(|(_, n)| matches!(n.kind, Kind::Free { .. })));
    }
}
