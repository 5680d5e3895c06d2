// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dynamic tree: insertion, removal, update and rebalancing.

mod query;
mod validate;

use alloc::collections::BTreeMap;
use core::fmt::Debug;

use crate::config::{Margin, TreeConfig};
use crate::error::{TreeError, TreeResult};
use crate::periodic::PeriodicBox;
use crate::pool::{Kind, NodeIdx, NodePool};
use crate::types::{Aabb, Touch};

/// A dynamic AABB tree over particles identified by `P`, in `D` dimensions.
///
/// Leaves store a fattened copy of each particle's bound so that small moves
/// don't touch the hierarchy. Internal nodes always hold the merge of their two
/// children, and sibling subtrees differ in height by at most one.
#[derive(Clone)]
pub struct Tree<P, const D: usize> {
    pool: NodePool<P, D>,
    root: Option<NodeIdx>,
    leaves: BTreeMap<P, NodeIdx>,
    domain: PeriodicBox<D>,
    margin: Margin,
    touch: Touch,
}

impl<P: Copy + Ord + Debug, const D: usize> Tree<P, D> {
    /// Create an empty tree.
    ///
    /// Fails if a domain length or the margin is invalid.
    pub fn new(config: TreeConfig<D>) -> TreeResult<Self> {
        let domain = PeriodicBox::new(config.periodicity, config.box_lengths)?;
        let margin = config.margin.validate()?;
        Ok(Self {
            pool: NodePool::with_capacity(config.capacity),
            root: None,
            leaves: BTreeMap::new(),
            domain,
            margin,
            touch: config.touch,
        })
    }

    /// Create an empty tree over an open, non-periodic domain with the default margin.
    pub fn open() -> Self {
        let config = TreeConfig::<D>::default();
        Self {
            pool: NodePool::with_capacity(config.capacity),
            root: None,
            leaves: BTreeMap::new(),
            domain: PeriodicBox::open(),
            margin: config.margin,
            touch: config.touch,
        }
    }

    /// Insert a sphere (disc in 2D) of `radius` around `centre`.
    pub fn insert_particle(
        &mut self,
        particle: P,
        centre: [f64; D],
        radius: f64,
    ) -> TreeResult<()> {
        self.insert_particle_aabb(particle, Aabb::from_centre_radius(centre, radius))
    }

    /// Insert a particle from runtime-length lower/upper bounds.
    pub fn insert_particle_bounds(
        &mut self,
        particle: P,
        lower: &[f64],
        upper: &[f64],
    ) -> TreeResult<()> {
        self.insert_particle_aabb(particle, Aabb::try_from_slices(lower, upper)?)
    }

    /// Insert a particle with the given tight bound.
    ///
    /// Fails with [`TreeError::DuplicateParticle`] if `particle` is already stored.
    pub fn insert_particle_aabb(&mut self, particle: P, tight: Aabb<D>) -> TreeResult<()> {
        if self.leaves.contains_key(&particle) {
            return Err(TreeError::duplicate(&particle));
        }
        let fat = self.margin.fatten(&tight);
        let leaf = self
            .pool
            .allocate(fat, None, 0, Kind::Leaf { particle, tight });
        self.insert_leaf(leaf);
        self.leaves.insert(particle, leaf);
        Ok(())
    }

    /// Remove a particle.
    ///
    /// Fails with [`TreeError::UnknownParticle`] if `particle` is not stored.
    pub fn remove_particle(&mut self, particle: P) -> TreeResult<()> {
        let leaf = self
            .leaves
            .remove(&particle)
            .ok_or_else(|| TreeError::unknown(&particle))?;
        self.detach_leaf(leaf);
        let _ = self.pool.release(leaf);
        Ok(())
    }

    /// Remove every particle. Node capacity is kept.
    pub fn remove_all(&mut self) {
        tracing::debug!(particles = self.leaves.len(), "clearing tree");
        self.pool.clear();
        self.leaves.clear();
        self.root = None;
    }

    /// Move a sphere (disc in 2D) particle. See [`Tree::update_particle_aabb`].
    pub fn update_particle(
        &mut self,
        particle: P,
        centre: [f64; D],
        radius: f64,
    ) -> TreeResult<bool> {
        self.update_particle_aabb(particle, Aabb::from_centre_radius(centre, radius))
    }

    /// Move a particle given runtime-length lower/upper bounds.
    pub fn update_particle_bounds(
        &mut self,
        particle: P,
        lower: &[f64],
        upper: &[f64],
    ) -> TreeResult<bool> {
        self.update_particle_aabb(particle, Aabb::try_from_slices(lower, upper)?)
    }

    /// Give a particle a new tight bound. Returns whether the hierarchy changed.
    ///
    /// While the stored fat bound still contains `tight` only the tight bound is
    /// recorded and the structure is left alone. Otherwise the leaf is taken out,
    /// re-fattened around `tight` and inserted again.
    pub fn update_particle_aabb(&mut self, particle: P, tight: Aabb<D>) -> TreeResult<bool> {
        let leaf = self.leaf_of(particle)?;
        self.set_tight(leaf, tight);
        if self.pool[leaf].fat.contains(&tight) {
            return Ok(false);
        }
        self.reinsert_leaf(leaf, tight);
        tracing::trace!(?particle, "refit leaf");
        Ok(true)
    }

    /// Re-fatten and reinsert a particle even if its fat bound still covers `tight`.
    pub fn reinsert_particle(&mut self, particle: P, tight: Aabb<D>) -> TreeResult<()> {
        let leaf = self.leaf_of(particle)?;
        self.set_tight(leaf, tight);
        self.reinsert_leaf(leaf, tight);
        Ok(())
    }

    /// Replace the domain. Stored bounds are unwrapped, so the hierarchy stays valid.
    pub fn set_periodic_box(&mut self, domain: PeriodicBox<D>) {
        self.domain = domain;
    }

    /// The domain queries wrap in.
    pub fn periodic_box(&self) -> &PeriodicBox<D> {
        &self.domain
    }

    /// The fattening policy.
    pub fn margin(&self) -> Margin {
        self.margin
    }

    /// The touching policy.
    pub fn touch(&self) -> Touch {
        self.touch
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether the tree holds no particles.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Whether `particle` is stored.
    pub fn contains_particle(&self, particle: P) -> bool {
        self.leaves.contains_key(&particle)
    }

    /// Stored particle identifiers, in ascending order.
    pub fn particles(&self) -> impl Iterator<Item = P> + '_ {
        self.leaves.keys().copied()
    }

    /// The stored (fattened) bound of `particle`.
    pub fn fat_aabb(&self, particle: P) -> Option<Aabb<D>> {
        self.leaves.get(&particle).map(|&leaf| self.pool[leaf].fat)
    }

    /// The tight bound last supplied for `particle`.
    pub fn tight_aabb(&self, particle: P) -> Option<Aabb<D>> {
        let &leaf = self.leaves.get(&particle)?;
        match self.pool[leaf].kind {
            Kind::Leaf { tight, .. } => Some(tight),
            _ => None,
        }
    }

    fn leaf_of(&self, particle: P) -> TreeResult<NodeIdx> {
        self.leaves
            .get(&particle)
            .copied()
            .ok_or_else(|| TreeError::unknown(&particle))
    }

    fn set_tight(&mut self, leaf: NodeIdx, new_tight: Aabb<D>) {
        match &mut self.pool[leaf].kind {
            Kind::Leaf { tight, .. } => *tight = new_tight,
            other => unreachable!("particle maps to non-leaf node {leaf:?}: {other:?}"),
        }
    }

    fn reinsert_leaf(&mut self, leaf: NodeIdx, tight: Aabb<D>) {
        self.detach_leaf(leaf);
        let fat = self.margin.fatten(&tight);
        let node = &mut self.pool[leaf];
        node.fat = fat;
        node.height = 0;
        self.insert_leaf(leaf);
    }

    /// Hang an allocated leaf into the hierarchy.
    fn insert_leaf(&mut self, leaf: NodeIdx) {
        let Some(root) = self.root else {
            self.pool[leaf].parent = None;
            self.root = Some(leaf);
            return;
        };

        let fat = self.pool[leaf].fat;
        let sibling = self.pick_sibling(root, &fat);

        let old_parent = self.pool[sibling].parent;
        let merged = fat.merge(&self.pool[sibling].fat);
        let branch = self.pool.allocate(
            merged,
            old_parent,
            1,
            Kind::Internal {
                children: [sibling, leaf],
            },
        );
        self.pool[sibling].parent = Some(branch);
        self.pool[leaf].parent = Some(branch);
        match old_parent {
            Some(parent) => self.replace_child(parent, sibling, branch),
            None => self.root = Some(branch),
        }

        self.refit_upwards(old_parent);
    }

    /// Greedy descent: at each internal node follow the child whose bound grows
    /// least when merged with `fat`. Ends at a leaf.
    fn pick_sibling(&self, root: NodeIdx, fat: &Aabb<D>) -> NodeIdx {
        let mut index = root;
        while let Some([left, right]) = self.pool[index].children() {
            let growth = |child: NodeIdx| {
                let bound = &self.pool[child].fat;
                bound.merge(fat).surface_area() - bound.surface_area()
            };
            index = if growth(left) <= growth(right) {
                left
            } else {
                right
            };
        }
        index
    }

    /// Unlink a leaf from the hierarchy without releasing its slot.
    ///
    /// The leaf's parent is dissolved and its sibling takes the parent's place.
    fn detach_leaf(&mut self, leaf: NodeIdx) {
        let Some(parent) = self.pool[leaf].parent else {
            debug_assert_eq!(self.root, Some(leaf), "orphan leaf {leaf:?} is not the root");
            self.root = None;
            return;
        };
        let Some(children) = self.pool[parent].children() else {
            unreachable!("parent {parent:?} of {leaf:?} is not internal");
        };
        let sibling = if children[0] == leaf {
            children[1]
        } else {
            children[0]
        };
        let grandparent = self.pool[parent].parent;

        self.pool[sibling].parent = grandparent;
        match grandparent {
            Some(g) => self.replace_child(g, parent, sibling),
            None => self.root = Some(sibling),
        }
        let _ = self.pool.release(parent);
        self.pool[leaf].parent = None;

        self.refit_upwards(grandparent);
    }

    fn replace_child(&mut self, parent: NodeIdx, old: NodeIdx, new: NodeIdx) {
        match &mut self.pool[parent].kind {
            Kind::Internal { children } => {
                for child in children.iter_mut().filter(|c| **c == old) {
                    *child = new;
                }
            }
            other => unreachable!("parent {parent:?} is not internal: {other:?}"),
        }
    }

    /// Walk from `start` to the root, rebalancing and refreshing bounds and heights.
    fn refit_upwards(&mut self, start: Option<NodeIdx>) {
        let mut cursor = start;
        while let Some(index) = cursor {
            let index = self.balance(index);
            self.refit(index);
            cursor = self.pool[index].parent;
        }
    }

    /// Recompute an internal node's bound and height from its children.
    fn refit(&mut self, index: NodeIdx) {
        let Some([left, right]) = self.pool[index].children() else {
            return;
        };
        let (l, r) = (&self.pool[left], &self.pool[right]);
        let fat = l.fat.merge(&r.fat);
        let height = 1 + l.height.max(r.height);
        let node = &mut self.pool[index];
        node.fat = fat;
        node.height = height;
    }

    /// Rotate at `a` if its children's heights differ by more than one.
    /// Returns the node now occupying `a`'s position.
    fn balance(&mut self, a: NodeIdx) -> NodeIdx {
        let Some([b, c]) = self.pool[a].children() else {
            return a;
        };
        let hb = self.pool[b].height;
        let hc = self.pool[c].height;
        if hc > hb + 1 {
            self.rotate_up(a, c, 1)
        } else if hb > hc + 1 {
            self.rotate_up(a, b, 0)
        } else {
            a
        }
    }

    /// Promote `child` (sitting in `slot` of `a`) into `a`'s place.
    ///
    /// `child` keeps its taller child and hands the other one to `a`, which
    /// becomes `child`'s first child.
    fn rotate_up(&mut self, a: NodeIdx, child: NodeIdx, slot: usize) -> NodeIdx {
        let Some([f, g]) = self.pool[child].children() else {
            return a;
        };
        let (keep, give) = if self.pool[f].height > self.pool[g].height {
            (f, g)
        } else {
            (g, f)
        };

        let parent = self.pool[a].parent;
        self.pool[child].parent = parent;
        match parent {
            Some(p) => self.replace_child(p, a, child),
            None => self.root = Some(child),
        }

        self.pool[child].kind = Kind::Internal {
            children: [a, keep],
        };
        self.pool[a].parent = Some(child);

        if let Kind::Internal { children } = &mut self.pool[a].kind {
            children[slot] = give;
        }
        self.pool[give].parent = Some(a);

        self.refit(a);
        self.refit(child);
        child
    }
}

impl<P: Copy + Ord + Debug, const D: usize> Default for Tree<P, D> {
    fn default() -> Self {
        Self::open()
    }
}

impl<P: Copy + Ord + Debug, const D: usize> Debug for Tree<P, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tree")
            .field("particles", &self.leaves.len())
            .field("nodes", &self.pool.in_use())
            .field("capacity", &self.pool.capacity())
            .field("height", &self.height())
            .field("domain", &self.domain)
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}

/// A tree of particles in the plane.
pub type Tree2<P> = Tree<P, 2>;

/// A tree of particles in space.
pub type Tree3<P> = Tree<P, 3>;
