// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural statistics and the consistency checker.

use alloc::format;
use alloc::vec;
#[cfg(test)]
use alloc::vec::Vec;
use core::fmt::Debug;

use super::Tree;
use crate::error::{TreeError, TreeResult};
use crate::pool::Kind;
#[cfg(test)]
use crate::pool::NodeIdx;
#[cfg(test)]
use crate::types::Aabb;

impl<P: Copy + Ord + Debug, const D: usize> Tree<P, D> {
    /// Height of the root; zero for an empty tree or a single leaf.
    pub fn height(&self) -> u32 {
        self.root.map_or(0, |root| self.pool[root].height)
    }

    /// Nodes currently in the hierarchy, leaves and internal nodes alike.
    pub fn node_count(&self) -> usize {
        self.pool.in_use()
    }

    /// Leaf nodes currently in use.
    pub fn leaf_count(&self) -> usize {
        self.pool.iter().filter(|(_, node)| node.is_leaf()).count()
    }

    /// Slots in the node pool, used or not.
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Length of the pool's free list.
    pub fn free_len(&self) -> usize {
        self.pool.free_len()
    }

    /// Largest height difference between the two children of any internal node.
    pub fn max_balance(&self) -> u32 {
        self.pool
            .iter()
            .filter_map(|(_, node)| node.children())
            .map(|[l, r]| self.pool[l].height.abs_diff(self.pool[r].height))
            .max()
            .unwrap_or(0)
    }

    /// Summed surface area of every node over that of the root.
    ///
    /// A rough quality measure: lower means tighter internal bounds. Zero for an
    /// empty tree or a root of zero area.
    pub fn surface_area_ratio(&self) -> f64 {
        let Some(root) = self.root else {
            return 0.0;
        };
        let root_area = self.pool[root].fat.surface_area();
        if root_area <= 0.0 {
            return 0.0;
        }
        let total: f64 = self
            .pool
            .iter()
            .filter(|(_, node)| !matches!(node.kind, Kind::Free { .. }))
            .map(|(_, node)| node.fat.surface_area())
            .sum();
        total / root_area
    }

    /// Walk the whole structure and check every invariant.
    ///
    /// Checks parent/child links, heights, that internal bounds are the merge of
    /// their children, the balance bound, that each leaf's fat bound covers its
    /// tight bound, that the particle map agrees with the leaves and that the
    /// free list threads exactly the unused slots.
    pub fn validate(&self) -> TreeResult<()> {
        let mut visited = 0_usize;
        if let Some(root) = self.root {
            if let Some(parent) = self.pool[root].parent {
                return Err(TreeError::corrupted(format!(
                    "root {root:?} has parent {parent:?}"
                )));
            }
            let mut stack = vec![root];
            while let Some(index) = stack.pop() {
                visited += 1;
                if visited > self.pool.capacity() {
                    return Err(TreeError::corrupted("cycle in hierarchy"));
                }
                let node = &self.pool[index];
                match node.kind {
                    Kind::Free { .. } => {
                        return Err(TreeError::corrupted(format!(
                            "free slot {index:?} is linked into the hierarchy"
                        )));
                    }
                    Kind::Leaf { particle, tight } => {
                        if node.height != 0 {
                            return Err(TreeError::corrupted(format!(
                                "leaf {index:?} has height {}",
                                node.height
                            )));
                        }
                        if !node.fat.contains(&tight) {
                            return Err(TreeError::corrupted(format!(
                                "leaf {index:?} does not cover its tight bound"
                            )));
                        }
                        if self.leaves.get(&particle) != Some(&index) {
                            return Err(TreeError::corrupted(format!(
                                "particle {particle:?} is not mapped to leaf {index:?}"
                            )));
                        }
                    }
                    Kind::Internal { children: [l, r] } => {
                        let (left, right) = (&self.pool[l], &self.pool[r]);
                        if left.parent != Some(index) || right.parent != Some(index) {
                            return Err(TreeError::corrupted(format!(
                                "children of {index:?} do not point back to it"
                            )));
                        }
                        if node.height != 1 + left.height.max(right.height) {
                            return Err(TreeError::corrupted(format!(
                                "stale height {} at {index:?}",
                                node.height
                            )));
                        }
                        if left.height.abs_diff(right.height) > 1 {
                            return Err(TreeError::corrupted(format!(
                                "unbalanced node {index:?}: heights {} and {}",
                                left.height, right.height
                            )));
                        }
                        if node.fat != left.fat.merge(&right.fat) {
                            return Err(TreeError::corrupted(format!(
                                "bound of {index:?} is not the merge of its children"
                            )));
                        }
                        stack.extend([l, r]);
                    }
                }
            }
        }

        if visited != self.pool.in_use() {
            return Err(TreeError::corrupted(format!(
                "{visited} nodes reachable but {} in use",
                self.pool.in_use()
            )));
        }
        let leaves = self.leaf_count();
        if leaves != self.leaves.len() {
            return Err(TreeError::corrupted(format!(
                "{leaves} leaves for {} particles",
                self.leaves.len()
            )));
        }
        if leaves > 0 && visited != 2 * leaves - 1 {
            return Err(TreeError::corrupted(format!(
                "{visited} nodes for {leaves} leaves"
            )));
        }
        let free = self.pool.free_len();
        if free != self.pool.capacity() - self.pool.in_use() {
            return Err(TreeError::corrupted(format!(
                "free list holds {free} of {} unused slots",
                self.pool.capacity() - self.pool.in_use()
            )));
        }
        if self.pool.free_head().is_some() != (free > 0) {
            return Err(TreeError::corrupted("free list head disagrees with length"));
        }
        Ok(())
    }

    /// Every in-use node with its links and bound, for comparing snapshots.
    #[cfg(test)]
    pub(crate) fn structure(&self) -> Vec<(NodeIdx, Option<NodeIdx>, u32, Aabb<D>)> {
        self.pool
            .iter()
            .filter(|(_, node)| !matches!(node.kind, Kind::Free { .. }))
            .map(|(index, node)| (index, node.parent, node.height, node.fat))
            .collect()
    }
}
