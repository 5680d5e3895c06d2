// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction parameters for [`Tree`](crate::Tree).

use crate::error::{TreeError, TreeResult};
use crate::periodic::Periodicity;
use crate::types::{Aabb, Touch};

/// How far a leaf's stored (fat) AABB extends beyond the object's tight AABB.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Margin {
    /// Pad every axis by a fixed distance on both sides.
    Absolute(f64),
    /// Pad every axis by this fraction of the tight extent on that axis.
    Relative(f64),
}

impl Margin {
    fn value(self) -> f64 {
        match self {
            Self::Absolute(m) | Self::Relative(m) => m,
        }
    }

    pub(crate) fn validate(self) -> TreeResult<Self> {
        let margin = self.value();
        if margin.is_nan() || margin < 0.0 {
            return Err(TreeError::InvalidMargin { margin });
        }
        Ok(self)
    }

    /// Per-axis padding for `tight`.
    pub(crate) fn padding<const D: usize>(self, tight: &Aabb<D>) -> [f64; D] {
        match self {
            Self::Absolute(m) => [m; D],
            Self::Relative(f) => {
                let size = tight.size();
                core::array::from_fn(|i| f * size[i])
            }
        }
    }

    /// The fat AABB stored for `tight`. Inverted axes are stored as a point.
    pub(crate) fn fatten<const D: usize>(self, tight: &Aabb<D>) -> Aabb<D> {
        tight.collapsed().fattened(self.padding(tight))
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::Absolute(0.1)
    }
}

/// Tree configuration.
///
/// Every field has a usable default: an open (non-periodic, unbounded) domain,
/// a fixed margin of `0.1`, room for 16 nodes and touching counted as overlap.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfig<const D: usize> {
    /// Fattening policy for leaf AABBs.
    pub margin: Margin,
    /// Which axes wrap.
    pub periodicity: Periodicity,
    /// Domain length per axis. Only periodic axes need a finite value.
    pub box_lengths: [f64; D],
    /// Initial node capacity. Only a hint; the pool grows on demand.
    pub capacity: usize,
    /// Whether touching boxes overlap.
    pub touch: Touch,
}

impl<const D: usize> Default for TreeConfig<D> {
    fn default() -> Self {
        Self {
            margin: Margin::default(),
            periodicity: Periodicity::empty(),
            box_lengths: [f64::INFINITY; D],
            capacity: 16,
            touch: Touch::Overlaps,
        }
    }
}

impl<const D: usize> TreeConfig<D> {
    /// Set the fattening margin.
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    /// Set which axes wrap and the domain length per axis.
    pub fn with_periodic_box(mut self, periodicity: Periodicity, box_lengths: [f64; D]) -> Self {
        self.periodicity = periodicity;
        self.box_lengths = box_lengths;
        self
    }

    /// Hint how many particles the tree will hold.
    ///
    /// A tree of `n` particles uses `2n - 1` nodes.
    pub fn with_particle_capacity(mut self, particles: usize) -> Self {
        self.capacity = particles.saturating_mul(2).max(1);
        self
    }

    /// Set the touching policy.
    pub fn with_touch(mut self, touch: Touch) -> Self {
        self.touch = touch;
        self
    }
}
