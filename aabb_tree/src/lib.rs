// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! AABB Tree: a dynamic bounding volume hierarchy for moving particles.
//!
//! The tree indexes axis-aligned bounding boxes (AABBs) in `D` dimensions and
//! answers "what overlaps this box?" queries. It is built for simulations where
//! every object moves a little on every step:
//!
//! - Leaves store a *fattened* copy of each bound, padded by a margin. An update
//!   that stays inside the fat bound is O(1) and leaves the hierarchy untouched.
//! - Insertion descends greedily by surface-area growth, and rotations on the way
//!   back up keep sibling heights within one of each other.
//! - Nodes live in one arena with an intrusive free list, so the steady state
//!   allocates nothing.
//! - Any subset of axes can be periodic. Overlap tests use the minimum image of
//!   the separation between box centres, so objects near opposite faces of the
//!   domain see each other.
//!
//! # Example
//!
//! ```rust
//! use aabb_tree::{Aabb, Periodicity, Tree, TreeConfig};
//!
//! // A 10 x 10 box, periodic on both axes.
//! let config = TreeConfig::default().with_periodic_box(Periodicity::all_axes(2), [10.0, 10.0]);
//! let mut tree: Tree<u32, 2> = Tree::new(config)?;
//!
//! tree.insert_particle(0, [9.9, 5.0], 0.5)?;
//! tree.insert_particle(1, [0.1, 5.0], 0.5)?;
//!
//! // The two discs touch across the x boundary.
//! assert_eq!(tree.query_particle(0)?, vec![1]);
//!
//! // Small moves stay inside the fat bound and don't restructure the tree.
//! assert!(!tree.update_particle(1, [0.15, 5.0], 0.5)?);
//!
//! let hits = tree.query(&Aabb::new([4.0, 4.0], [6.0, 6.0]));
//! assert!(hits.is_empty());
//! # Ok::<(), aabb_tree::TreeError>(())
//! ```
//!
//! ## Features
//!
//! - `kurbo`: conversions between [`Aabb<2>`](Aabb) and Kurbo's `Rect`, plus
//!   `Aabb::from_circle`.
//!
//! ### Float semantics
//!
//! Coordinates are `f64` and assumed free of NaNs. Inverted or zero-volume boxes
//! are accepted; they only make queries less precise.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod config;
pub mod error;
pub mod periodic;
mod pool;
pub mod tree;
pub mod types;

pub use config::{Margin, TreeConfig};
pub use error::{TreeError, TreeResult};
pub use periodic::{PeriodicBox, Periodicity};
pub use tree::{Tree, Tree2, Tree3};
pub use types::{Aabb, Touch};
