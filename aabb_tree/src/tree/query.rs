// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap queries.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::ControlFlow;

use super::Tree;
use crate::error::TreeResult;
use crate::pool::Kind;
use crate::types::Aabb;

impl<P: Copy + Ord + Debug, const D: usize> Tree<P, D> {
    /// Every particle whose fat bound overlaps `aabb`, with periodic wrap.
    ///
    /// The order of the result is unspecified.
    pub fn query(&self, aabb: &Aabb<D>) -> Vec<P> {
        let mut out = Vec::new();
        self.query_into(aabb, &mut out);
        out
    }

    /// Like [`Tree::query`], appending to `out` so a buffer can be reused.
    pub fn query_into(&self, aabb: &Aabb<D>, out: &mut Vec<P>) {
        let _ = self.for_each_overlap(aabb, |particle| {
            out.push(particle);
            ControlFlow::<()>::Continue(())
        });
    }

    /// Every particle overlapping the fat bound of `particle`, excluding itself.
    ///
    /// Fails with [`TreeError::UnknownParticle`](crate::TreeError::UnknownParticle)
    /// if `particle` is not stored.
    pub fn query_particle(&self, particle: P) -> TreeResult<Vec<P>> {
        let leaf = self.leaf_of(particle)?;
        let probe = self.pool[leaf].fat;
        let mut out = Vec::new();
        let _ = self.for_each_overlap(&probe, |other| {
            if other != particle {
                out.push(other);
            }
            ControlFlow::<()>::Continue(())
        });
        Ok(out)
    }

    /// Visit every particle whose fat bound overlaps `aabb`.
    ///
    /// The walk stops as soon as `visit` returns [`ControlFlow::Break`], and the
    /// break value is handed back.
    pub fn for_each_overlap<B>(
        &self,
        aabb: &Aabb<D>,
        mut visit: impl FnMut(P) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        let Some(root) = self.root else {
            return ControlFlow::Continue(());
        };
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &self.pool[index];
            if !node.fat.overlaps(aabb, &self.domain, self.touch) {
                continue;
            }
            match node.kind {
                Kind::Leaf { particle, .. } => visit(particle)?,
                Kind::Internal { children } => stack.extend(children),
                Kind::Free { .. } => unreachable!("free node {index:?} reachable from the root"),
            }
        }
        ControlFlow::Continue(())
    }
}
