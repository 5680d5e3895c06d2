// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree error types.

use alloc::string::String;

/// Errors reported when a caller breaks the tree's usage contract.
///
/// None of these leave the tree modified: every failing operation checks its
/// preconditions before touching any node.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// The identifier is already stored in the tree.
    #[error("particle {particle} already exists in the tree")]
    DuplicateParticle {
        /// `Debug` rendering of the identifier.
        particle: String,
    },
    /// The identifier is not stored in the tree.
    #[error("particle {particle} does not exist in the tree")]
    UnknownParticle {
        /// `Debug` rendering of the identifier.
        particle: String,
    },
    /// A runtime-sized position or bound has the wrong number of components.
    #[error("dimensionality mismatch: expected {expected} components, found {found}")]
    DimensionMismatch {
        /// The tree's dimensionality.
        expected: usize,
        /// Number of components supplied.
        found: usize,
    },
    /// A domain length is not positive, or a periodic axis is unbounded.
    #[error("invalid box length {length} on axis {axis}")]
    InvalidBoxLength {
        /// Offending axis.
        axis: usize,
        /// Offending length.
        length: f64,
    },
    /// The fattening margin is negative or not a number.
    #[error("invalid fattening margin {margin}")]
    InvalidMargin {
        /// Offending margin.
        margin: f64,
    },
    /// [`Tree::validate`](crate::Tree::validate) found a broken structural invariant.
    #[error("tree invariant violated: {reason}")]
    Corrupted {
        /// What was found.
        reason: String,
    },
}

/// Result alias used throughout the crate.
pub type TreeResult<T> = Result<T, TreeError>;

impl TreeError {
    pub(crate) fn duplicate(particle: &impl core::fmt::Debug) -> Self {
        Self::DuplicateParticle {
            particle: alloc::format!("{particle:?}"),
        }
    }

    pub(crate) fn unknown(particle: &impl core::fmt::Debug) -> Self {
        Self::UnknownParticle {
            particle: alloc::format!("{particle:?}"),
        }
    }

    pub(crate) fn corrupted(reason: impl Into<String>) -> Self {
        Self::Corrupted {
            reason: reason.into(),
        }
    }
}
