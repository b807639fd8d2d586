// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operations on owned meshes

use super::Mesh;
use crate::combiner::{CombineReport, MeshBooleanOperator};
use crate::error::CombineResult;
use serde::{Deserialize, Serialize};

/// Boolean operation between two closed meshes A and B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    /// A ∪ B
    Union,
    /// A − B
    Difference,
    /// B − A
    DifferenceInv,
    /// A ∩ B
    Intersection,
}

impl BooleanOp {
    /// Whether the result keeps the part of A outside B
    pub fn keep_front_a(self) -> bool {
        matches!(self, BooleanOp::Union | BooleanOp::Difference)
    }

    /// Whether the result keeps the part of B outside A
    pub fn keep_front_b(self) -> bool {
        matches!(self, BooleanOp::Union | BooleanOp::DifferenceInv)
    }
}

/// Perform boolean operation between two meshes with a default operator
pub fn perform_boolean_operation(
    mesh_a: &Mesh,
    mesh_b: &Mesh,
    op: BooleanOp,
) -> CombineResult<Mesh> {
    perform_boolean_operation_with(&MeshBooleanOperator::new(), mesh_a, mesh_b, op)
        .map(|(mesh, _)| mesh)
}

/// Combine copies of both meshes and merge the two halves into A's frame
pub fn perform_boolean_operation_with(
    operator: &MeshBooleanOperator,
    mesh_a: &Mesh,
    mesh_b: &Mesh,
    op: BooleanOp,
) -> CombineResult<(Mesh, CombineReport)> {
    let mut result = mesh_a.clone();
    let mut other = mesh_b.clone();
    let report = operator.combine_models(&mut result, &mut other, op)?;
    result.merge(&other);
    Ok((result, report))
}
