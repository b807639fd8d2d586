// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-call cutting context and the process-wide default precision

use crate::error::CombineError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Precision used when nothing else is configured
pub const DEFAULT_PRECISION: f64 = 1e-5;

static PRECISION_BITS: AtomicU64 = AtomicU64::new(DEFAULT_PRECISION.to_bits());

/// Set the default precision picked up by newly created operators
pub fn set_default_precision(precision: f64) -> Result<(), CombineError> {
    validate_precision(precision)?;
    PRECISION_BITS.store(precision.to_bits(), Ordering::Relaxed);
    Ok(())
}

/// Current default precision
pub fn default_precision() -> f64 {
    f64::from_bits(PRECISION_BITS.load(Ordering::Relaxed))
}

pub(crate) fn validate_precision(precision: f64) -> Result<(), CombineError> {
    if precision.is_finite() && precision > 0.0 {
        Ok(())
    } else {
        Err(CombineError::InvalidPrecision(precision))
    }
}

/// Immutable settings for cutting one model against another.
///
/// `keep_front` selects the part of the model lying outside the opposing
/// volume; otherwise the part inside it is kept. Regions lying on an opposing
/// face of the same plane are decided by the two coplanar flags instead, so
/// that an overlap shared by both surfaces ends up in the result once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutContext {
    pub epsilon: f64,
    pub keep_front: bool,
    /// Keep regions covered by an opposing face with the same orientation
    pub keep_coplanar_same: bool,
    /// Keep regions covered by an opposing face with the opposite orientation
    pub keep_coplanar_opposite: bool,
}

impl CutContext {
    /// Context for the first operand of a union or intersection: shared
    /// same-facing regions are kept, back-to-back contact is dropped
    pub fn new(epsilon: f64, keep_front: bool) -> Self {
        Self {
            epsilon,
            keep_front,
            keep_coplanar_same: true,
            keep_coplanar_opposite: false,
        }
    }

    /// Context for one operand of a combination.
    ///
    /// A same-facing overlap belongs to the union or intersection and is
    /// emitted by the `primary` operand only. An opposite-facing contact
    /// survives only on the operand that is subtracted from.
    pub fn for_operand(
        epsilon: f64,
        keep_front: bool,
        opposite_keeps_front: bool,
        primary: bool,
    ) -> Self {
        Self {
            epsilon,
            keep_front,
            keep_coplanar_same: primary && keep_front == opposite_keeps_front,
            keep_coplanar_opposite: keep_front && !opposite_keeps_front,
        }
    }

    /// Whether a point at `signed` distance from an opposing plane lies on the discarded side
    pub fn is_discarded_side(&self, signed: f64) -> bool {
        if self.keep_front {
            signed <= -self.epsilon
        } else {
            signed >= self.epsilon
        }
    }

    /// Whether a region on an opposing coplanar face is kept
    pub fn keeps_coplanar(&self, same_orientation: bool) -> bool {
        if same_orientation {
            self.keep_coplanar_same
        } else {
            self.keep_coplanar_opposite
        }
    }
}

/// Settings for writing a cut model back into its host mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    pub keep_front: bool,
    /// Reverse winding and negate normals of every emitted triangle
    pub flip: bool,
}

impl BuildContext {
    /// Only the subtracted operand has its surface turned inside out.
    ///
    /// Keeping the back side alone does not flip: the inner part an
    /// intersection keeps already faces outward, so both of its operands
    /// are written with their source winding.
    pub fn new(keep_front: bool, opposite_keeps_front: bool) -> Self {
        Self {
            keep_front,
            flip: !keep_front && opposite_keeps_front,
        }
    }
}
