// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use crate::error::{TreeError, TreeResult};
use crate::periodic::PeriodicBox;

/// Axis-aligned bounding box in `D` dimensions.
///
/// A validly constructed box has `lower[i] <= upper[i]` on every axis. Inverted
/// or zero-volume boxes are accepted everywhere; they only make queries less
/// precise.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb<const D: usize> {
    /// Lower bound per axis.
    pub lower: [f64; D],
    /// Upper bound per axis.
    pub upper: [f64; D],
}

/// Whether boxes that merely touch (share a face, edge or corner) count as overlapping.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Touch {
    /// Touching boxes overlap. Matches a closed-interval test.
    #[default]
    Overlaps,
    /// Touching boxes are separate. Matches an open-interval test.
    Separate,
}

impl<const D: usize> Aabb<D> {
    /// Create a new AABB from lower/upper corners.
    pub const fn new(lower: [f64; D], upper: [f64; D]) -> Self {
        Self { lower, upper }
    }

    /// The bound of a sphere (disc in 2D) of `radius` around `centre`.
    pub fn from_centre_radius(centre: [f64; D], radius: f64) -> Self {
        Self {
            lower: core::array::from_fn(|i| centre[i] - radius),
            upper: core::array::from_fn(|i| centre[i] + radius),
        }
    }

    /// Build an AABB from runtime-length slices.
    ///
    /// Fails with [`TreeError::DimensionMismatch`] if either slice does not hold
    /// exactly `D` values.
    pub fn try_from_slices(lower: &[f64], upper: &[f64]) -> TreeResult<Self> {
        let lower: [f64; D] = lower
            .try_into()
            .map_err(|_| TreeError::DimensionMismatch {
                expected: D,
                found: lower.len(),
            })?;
        let upper: [f64; D] = upper
            .try_into()
            .map_err(|_| TreeError::DimensionMismatch {
                expected: D,
                found: upper.len(),
            })?;
        Ok(Self { lower, upper })
    }

    /// Midpoint of the box on every axis.
    pub fn centre(&self) -> [f64; D] {
        core::array::from_fn(|i| 0.5 * (self.lower[i] + self.upper[i]))
    }

    /// Extent of the box on every axis, clamped at zero for inverted boxes.
    pub fn size(&self) -> [f64; D] {
        core::array::from_fn(|i| (self.upper[i] - self.lower[i]).max(0.0))
    }

    /// Half of [`Aabb::size`].
    pub fn half_extents(&self) -> [f64; D] {
        let size = self.size();
        core::array::from_fn(|i| 0.5 * size[i])
    }

    /// Cost proxy used by the insertion heuristic.
    ///
    /// Length in 1D, perimeter in 2D, surface area in 3D; in general twice the sum
    /// over axes of the product of the other extents.
    pub fn surface_area(&self) -> f64 {
        let size = self.size();
        if D == 1 {
            return size[0];
        }
        let mut sum = 0.0;
        for skip in 0..D {
            let mut product = 1.0;
            for (axis, extent) in size.iter().enumerate() {
                if axis != skip {
                    product *= extent;
                }
            }
            sum += product;
        }
        2.0 * sum
    }

    /// The smallest box containing both `self` and `other`.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            lower: core::array::from_fn(|i| self.lower[i].min(other.lower[i])),
            upper: core::array::from_fn(|i| self.upper[i].max(other.upper[i])),
        }
    }

    /// Whether `inner` lies within `self` on every axis. No periodic wrap is applied.
    pub fn contains(&self, inner: &Self) -> bool {
        (0..D).all(|i| inner.lower[i] >= self.lower[i] && inner.upper[i] <= self.upper[i])
    }

    /// Plain interval-overlap test, ignoring periodicity.
    pub fn overlaps_local(&self, other: &Self, touch: Touch) -> bool {
        match touch {
            Touch::Overlaps => {
                (0..D).all(|i| other.lower[i] <= self.upper[i] && other.upper[i] >= self.lower[i])
            }
            Touch::Separate => {
                (0..D).all(|i| other.lower[i] < self.upper[i] && other.upper[i] > self.lower[i])
            }
        }
    }

    /// Overlap test under periodic boundaries.
    ///
    /// The separation between centres is reduced to its minimum image on every
    /// periodic axis before the intervals are compared, so a box hugging one edge
    /// of the domain overlaps a box hugging the opposite edge.
    pub fn overlaps(&self, other: &Self, domain: &PeriodicBox<D>, touch: Touch) -> bool {
        let a = self.centre();
        let b = other.centre();
        let mut separation: [f64; D] = core::array::from_fn(|i| b[i] - a[i]);
        domain.minimum_image(&mut separation);
        let ha = self.half_extents();
        let hb = other.half_extents();
        (0..D).all(|i| {
            let reach = ha[i] + hb[i];
            let gap = separation[i].abs();
            match touch {
                Touch::Overlaps => gap <= reach,
                Touch::Separate => gap < reach,
            }
        })
    }

    /// Grow every axis by `margin` on both sides.
    pub fn fattened(&self, margin: [f64; D]) -> Self {
        Self {
            lower: core::array::from_fn(|i| self.lower[i] - margin[i]),
            upper: core::array::from_fn(|i| self.upper[i] + margin[i]),
        }
    }

    /// Shift the box by `offset`.
    pub fn translated(&self, offset: [f64; D]) -> Self {
        Self {
            lower: core::array::from_fn(|i| self.lower[i] + offset[i]),
            upper: core::array::from_fn(|i| self.upper[i] + offset[i]),
        }
    }

    /// Return true if the box is inverted on some axis. Assumes no NaN.
    pub fn is_inverted(&self) -> bool {
        (0..D).any(|i| self.upper[i] < self.lower[i])
    }

    /// Collapse every inverted axis to its midpoint. Valid axes are unchanged.
    pub fn collapsed(&self) -> Self {
        if !self.is_inverted() {
            return *self;
        }
        let centre = self.centre();
        Self {
            lower: core::array::from_fn(|i| self.lower[i].min(centre[i])),
            upper: core::array::from_fn(|i| self.upper[i].max(centre[i])),
        }
    }
}

#[cfg(feature = "kurbo")]
mod kurbo_interop {
    use super::Aabb;

    impl From<kurbo::Rect> for Aabb<2> {
        fn from(rect: kurbo::Rect) -> Self {
            let rect = rect.abs();
            Self::new([rect.x0, rect.y0], [rect.x1, rect.y1])
        }
    }

    impl From<Aabb<2>> for kurbo::Rect {
        fn from(aabb: Aabb<2>) -> Self {
            Self::new(aabb.lower[0], aabb.lower[1], aabb.upper[0], aabb.upper[1])
        }
    }

    impl Aabb<2> {
        /// The bound of a Kurbo circle.
        pub fn from_circle(circle: kurbo::Circle) -> Self {
            Self::from_centre_radius([circle.center.x, circle.center.y], circle.radius)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periodic::Periodicity;

    #[test]
    fn merge_is_componentwise() {
        let a = Aabb::new([0.0, 2.0], [1.0, 3.0]);
        let b = Aabb::new([-1.0, 2.5], [0.5, 4.0]);
        assert_eq!(a.merge(&b), Aabb::new([-1.0, 2.0], [1.0, 4.0]));
        assert_eq!(a.merge(&b), b.merge(&a));
    }

    #[test]
    fn contains_is_inclusive() {
        let outer = Aabb::new([0.0, 0.0], [10.0, 10.0]);
        assert!(outer.contains(&outer));
        assert!(outer.contains(&Aabb::new([1.0, 1.0], [9.0, 10.0])));
        assert!(!outer.contains(&Aabb::new([-0.1, 1.0], [9.0, 9.0])));
    }

    #[test]
    fn surface_area_per_dimension() {
        assert_eq!(Aabb::new([1.0], [4.0]).surface_area(), 3.0);
        assert_eq!(Aabb::new([0.0, 0.0], [2.0, 3.0]).surface_area(), 10.0);
        assert_eq!(
            Aabb::new([0.0, 0.0, 0.0], [1.0, 2.0, 3.0]).surface_area(),
            22.0
        );
        // Inverted axes contribute nothing.
        assert_eq!(Aabb::new([0.0, 5.0], [2.0, 3.0]).surface_area(), 4.0);
    }

    #[test]
    fn touching_boxes_follow_policy() {
        let a = Aabb::new([0.0, 0.0], [1.0, 1.0]);
        let b = Aabb::new([1.0, 0.0], [2.0, 1.0]);
        assert!(a.overlaps_local(&b, Touch::Overlaps));
        assert!(!a.overlaps_local(&b, Touch::Separate));
        let open = PeriodicBox::open();
        assert!(a.overlaps(&b, &open, Touch::Overlaps));
        assert!(!a.overlaps(&b, &open, Touch::Separate));
    }

    #[test]
    fn periodic_overlap_wraps_across_the_edge() {
        let a = Aabb::from_centre_radius([9.9, 5.0], 0.5);
        let b = Aabb::from_centre_radius([0.1, 5.0], 0.5);
        let wrapped = PeriodicBox::new(Periodicity::all_axes(2), [10.0, 10.0]).unwrap();
        let open = PeriodicBox::new(Periodicity::empty(), [10.0, 10.0]).unwrap();
        assert!(a.overlaps(&b, &wrapped, Touch::Overlaps));
        assert!(!a.overlaps(&b, &open, Touch::Overlaps));
        assert!(!a.overlaps_local(&b, Touch::Overlaps));
    }

    #[test]
    fn periodicity_is_per_axis() {
        let a = Aabb::from_centre_radius([9.9, 9.9], 0.5);
        let b = Aabb::from_centre_radius([0.1, 0.1], 0.5);
        let x_only = PeriodicBox::new(Periodicity::X, [10.0, 10.0]).unwrap();
        assert!(!a.overlaps(&b, &x_only, Touch::Overlaps));
        let c = Aabb::from_centre_radius([0.1, 9.5], 0.5);
        assert!(a.overlaps(&c, &x_only, Touch::Overlaps));
    }

    #[test]
    fn slices_must_match_dimension() {
        let ok = Aabb::<2>::try_from_slices(&[0.0, 1.0], &[2.0, 3.0]).unwrap();
        assert_eq!(ok, Aabb::new([0.0, 1.0], [2.0, 3.0]));
        let err = Aabb::<2>::try_from_slices(&[0.0, 1.0, 2.0], &[2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            TreeError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        );
        assert!(Aabb::<3>::try_from_slices(&[0.0; 3], &[1.0]).is_err());
    }

    #[test]
    fn fattened_and_translated() {
        let a = Aabb::new([0.0, 0.0], [1.0, 2.0]);
        assert_eq!(
            a.fattened([0.5, 0.25]),
            Aabb::new([-0.5, -0.25], [1.5, 2.25])
        );
        assert_eq!(a.translated([1.0, -1.0]), Aabb::new([1.0, -1.0], [2.0, 1.0]));
        assert_eq!(a.centre(), [0.5, 1.0]);
        assert_eq!(a.half_extents(), [0.5, 1.0]);
        assert!(!a.is_inverted());
        assert!(Aabb::new([1.0], [0.0]).is_inverted());
    }

    #[test]
    fn collapsed_only_touches_inverted_axes() {
        let valid = Aabb::new([0.0, 0.0], [1.0, 2.0]);
        assert_eq!(valid.collapsed(), valid);
        let inverted = Aabb::new([0.0, 3.0], [1.0, 2.0]);
        let point = inverted.collapsed();
        assert_eq!(point, Aabb::new([0.0, 2.5], [1.0, 2.5]));
        assert!(!point.is_inverted());
        assert!(point.contains(&inverted));
    }
}
