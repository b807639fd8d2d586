// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parallel boolean operations using rayon

use super::boolean::perform_boolean_operation_with;
use super::{BooleanOp, Mesh};
use crate::combiner::{CombineReport, MeshBooleanOperator};
use crate::error::{CombineError, CombineResult};
use rayon::prelude::*;

/// Runs many boolean operations with one shared operator
#[derive(Debug, Default)]
pub struct ParallelBooleanExecutor {
    operator: MeshBooleanOperator,
}

impl ParallelBooleanExecutor {
    pub fn new(operator: MeshBooleanOperator) -> Self {
        Self { operator }
    }

    pub fn operator(&self) -> &MeshBooleanOperator {
        &self.operator
    }

    /// Combine independent pairs concurrently, results in input order
    pub fn combine_pairs(
        &self,
        pairs: &[(Mesh, Mesh)],
        op: BooleanOp,
    ) -> Vec<CombineResult<(Mesh, CombineReport)>> {
        pairs
            .par_iter()
            .map(|(a, b)| perform_boolean_operation_with(&self.operator, a, b, op))
            .collect()
    }

    /// Fold `meshes` with an associative operation as a parallel tree reduction
    pub fn execute_parallel(&self, meshes: Vec<Mesh>, op: BooleanOp) -> CombineResult<Mesh> {
        if meshes.is_empty() {
            return Err(CombineError::EmptyInput {
                operand: format!("no meshes to combine with {:?}", op),
            });
        }

        meshes
            .into_par_iter()
            .map(Ok)
            .reduce_with(|acc, mesh| {
                let (acc, mesh) = (acc?, mesh?);
                perform_boolean_operation_with(&self.operator, &acc, &mesh, op).map(|(m, _)| m)
            })
            .unwrap_or_else(|| {
                Err(CombineError::EmptyInput {
                    operand: "no meshes to combine".to_string(),
                })
            })
    }

    /// Parallel union of meshes
    pub fn union_parallel(&self, meshes: Vec<Mesh>) -> CombineResult<Mesh> {
        self.execute_parallel(meshes, BooleanOp::Union)
    }

    /// Parallel intersection of meshes
    pub fn intersection_parallel(&self, meshes: Vec<Mesh>) -> CombineResult<Mesh> {
        self.execute_parallel(meshes, BooleanOp::Intersection)
    }

    /// First mesh minus all others, applied in order
    pub fn difference_sequential(&self, meshes: Vec<Mesh>) -> CombineResult<Mesh> {
        let mut iter = meshes.into_iter();
        let mut result = iter.next().ok_or_else(|| CombineError::EmptyInput {
            operand: "no mesh to subtract from".to_string(),
        })?;

        for mesh in iter {
            result = perform_boolean_operation_with(
                &self.operator,
                &result,
                &mesh,
                BooleanOp::Difference,
            )?
            .0;
        }

        Ok(result)
    }
}
