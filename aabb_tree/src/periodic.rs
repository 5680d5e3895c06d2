// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Periodic (wrap-around) domain helpers.

use crate::error::{TreeError, TreeResult};

bitflags::bitflags! {
    /// Per-axis periodicity flags. Bit `i` marks axis `i` as periodic.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Periodicity: u32 {
        /// The first axis wraps.
        const X = 1 << 0;
        /// The second axis wraps.
        const Y = 1 << 1;
        /// The third axis wraps.
        const Z = 1 << 2;
        // Higher dimensions are addressed through `Periodicity::axis`.
        const _ = !0;
    }
}

impl Default for Periodicity {
    fn default() -> Self {
        Self::empty()
    }
}

impl Periodicity {
    /// The flag for a single axis. Axes past the 32nd yield no flag.
    pub fn axis(axis: usize) -> Self {
        u32::try_from(axis)
            .ok()
            .and_then(|shift| 1_u32.checked_shl(shift))
            .map_or(Self::empty(), Self::from_bits_retain)
    }

    /// Every one of the first `dimensions` axes is periodic.
    pub fn all_axes(dimensions: usize) -> Self {
        (0..dimensions).fold(Self::empty(), |acc, axis| acc | Self::axis(axis))
    }

    /// Whether `axis` wraps.
    pub fn is_periodic(self, axis: usize) -> bool {
        let flag = Self::axis(axis);
        !flag.is_empty() && self.contains(flag)
    }
}

/// The simulation domain: which axes wrap and how long each axis is.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PeriodicBox<const D: usize> {
    periodicity: Periodicity,
    lengths: [f64; D],
}

impl<const D: usize> PeriodicBox<D> {
    /// Create a domain.
    ///
    /// Every length must be positive (`f64::INFINITY` is fine for open axes) and
    /// periodic axes need a finite length. Flags for axes `>= D` are dropped.
    pub fn new(periodicity: Periodicity, lengths: [f64; D]) -> TreeResult<Self> {
        let periodicity = periodicity & Periodicity::all_axes(D);
        for (axis, &length) in lengths.iter().enumerate() {
            let finite_needed = periodicity.is_periodic(axis);
            if length.is_nan() || length <= 0.0 || (finite_needed && !length.is_finite()) {
                return Err(TreeError::InvalidBoxLength { axis, length });
            }
        }
        Ok(Self {
            periodicity,
            lengths,
        })
    }

    /// An unbounded domain with no periodic axes.
    pub fn open() -> Self {
        Self {
            periodicity: Periodicity::empty(),
            lengths: [f64::INFINITY; D],
        }
    }

    /// The periodicity flags, restricted to the first `D` axes.
    pub fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    /// Length of every axis.
    pub fn lengths(&self) -> [f64; D] {
        self.lengths
    }

    /// Whether any axis wraps.
    pub fn is_periodic(&self) -> bool {
        !self.periodicity.is_empty()
    }

    /// Reduce a separation vector to its minimum image. Returns whether any axis moved.
    ///
    /// On a periodic axis of length `L` a component below `-L/2` gains `L` and one
    /// at or above `L/2` loses `L`. Separations are expected to lie within one box
    /// length, which holds for positions kept in the canonical domain.
    pub fn minimum_image(&self, separation: &mut [f64; D]) -> bool {
        let mut shifted = false;
        for (axis, component) in separation.iter_mut().enumerate() {
            if !self.periodicity.is_periodic(axis) {
                continue;
            }
            let length = self.lengths[axis];
            if *component < -0.5 * length {
                *component += length;
                shifted = true;
            } else if *component >= 0.5 * length {
                *component -= length;
                shifted = true;
            }
        }
        shifted
    }

    /// Bring a position back into `[0, L)` on every periodic axis. Returns whether it moved.
    ///
    /// Positions are expected to be at most one box length outside the domain,
    /// as after a single small displacement.
    pub fn wrap_position(&self, position: &mut [f64; D]) -> bool {
        let mut wrapped = false;
        for (axis, coordinate) in position.iter_mut().enumerate() {
            if !self.periodicity.is_periodic(axis) {
                continue;
            }
            let length = self.lengths[axis];
            if *coordinate < 0.0 {
                *coordinate += length;
                wrapped = true;
            } else if *coordinate >= length {
                *coordinate -= length;
                wrapped = true;
            }
        }
        wrapped
    }
}

impl<const D: usize> Default for PeriodicBox<D> {
    fn default() -> Self {
        Self::open()
    }
}
