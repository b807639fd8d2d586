// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh combination

use thiserror::Error;

/// Errors raised before the combination algorithm starts. Once both meshes
/// have been validated the algorithm degrades silently instead of failing;
/// see [`crate::combiner::CombineReport`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombineError {
    /// Precision must be a positive, finite number
    #[error("invalid precision {0}: expected a positive finite value")]
    InvalidPrecision(f64),

    /// A triangle references a vertex the surface does not have
    #[error(
        "triangle {triangle} of surface {surface} references vertex {index}, \
         but the surface has {vertex_count} vertices"
    )]
    IndexOutOfRange {
        surface: usize,
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    /// A batch operation was given nothing to combine
    #[error("empty input: {operand}")]
    EmptyInput { operand: String },
}

/// Result type for combination operations
pub type CombineResult<T> = Result<T, CombineError>;
