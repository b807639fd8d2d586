// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Entry point: combine two host meshes in place

use super::context::{default_precision, set_default_precision, validate_precision};
use super::context::{BuildContext, CutContext};
use super::host::BooleanMesh;
use super::model::Model;
use super::report::CombineReport;
use super::strategy::{BruteForce, BvhCulled, DeltaConnector, IntersectionStrategy, Retriangulator};
use crate::config::{CombinerConfig, IntersectionMode};
use crate::error::CombineError;
use crate::geometry::BooleanOp;
use tracing::{debug, info};

/// Cuts two meshes against each other and rewrites both with the part of
/// their surface the boolean operation keeps.
///
/// An operator holds no per-call state: one instance may run any number of
/// combinations, also from several threads at once.
pub struct MeshBooleanOperator {
    epsilon: f64,
    intersection: Box<dyn IntersectionStrategy>,
    retriangulator: Box<dyn Retriangulator>,
}

impl std::fmt::Debug for MeshBooleanOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshBooleanOperator")
            .field("epsilon", &self.epsilon)
            .field("intersection", &self.intersection.name())
            .field("retriangulator", &self.retriangulator.name())
            .finish()
    }
}

impl Default for MeshBooleanOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBooleanOperator {
    /// Operator using the current default precision and testing every triangle pair
    pub fn new() -> Self {
        Self {
            epsilon: default_precision(),
            intersection: Box::new(BruteForce),
            retriangulator: Box::new(DeltaConnector),
        }
    }

    pub fn with_precision(precision: f64) -> Result<Self, CombineError> {
        validate_precision(precision)?;
        Ok(Self {
            epsilon: precision,
            ..Self::new()
        })
    }

    pub fn from_config(config: &CombinerConfig) -> Result<Self, CombineError> {
        let operator = Self::with_precision(config.precision)?;
        Ok(match config.intersection {
            IntersectionMode::BruteForce => operator.with_intersection_strategy(BruteForce),
            IntersectionMode::Bvh => operator.with_intersection_strategy(BvhCulled),
        })
    }

    pub fn with_intersection_strategy(
        mut self,
        strategy: impl IntersectionStrategy + 'static,
    ) -> Self {
        self.intersection = Box::new(strategy);
        self
    }

    pub fn with_retriangulator(mut self, retriangulator: impl Retriangulator + 'static) -> Self {
        self.retriangulator = Box::new(retriangulator);
        self
    }

    pub fn precision(&self) -> f64 {
        self.epsilon
    }

    /// Set the precision newly created operators start with
    pub fn set_precision(precision: f64) -> Result<(), CombineError> {
        set_default_precision(precision)
    }

    pub fn get_precision() -> f64 {
        default_precision()
    }

    /// Combine `mesh_a` with `mesh_b`, replacing the triangles of both.
    ///
    /// Afterwards each mesh holds its own share of the result with identity
    /// rotation and unit scale; the caller merges them if a single mesh is
    /// wanted. Both meshes are validated before either is touched.
    pub fn combine_models<A, B>(
        &self,
        mesh_a: &mut A,
        mesh_b: &mut B,
        method: BooleanOp,
    ) -> Result<CombineReport, CombineError>
    where
        A: BooleanMesh,
        B: BooleanMesh,
    {
        let mut model_a = Model::new(mesh_a)?;
        let mut model_b = Model::new(mesh_b)?;

        let keep_front_a = method.keep_front_a();
        let keep_front_b = method.keep_front_b();
        debug!(
            ?method,
            epsilon = self.epsilon,
            triangles_a = model_a.triangles().len(),
            triangles_b = model_b.triangles().len(),
            "combining models"
        );

        model_a.create_faces(self.epsilon);
        model_b.create_faces(self.epsilon);

        let ctx_a = CutContext::for_operand(self.epsilon, keep_front_a, keep_front_b, true);
        let ctx_b = CutContext::for_operand(self.epsilon, keep_front_b, keep_front_a, false);
        self.cut_model(&mut model_a, &model_b, &ctx_a);
        self.cut_model(&mut model_b, &model_a, &ctx_b);

        let report = CombineReport {
            method,
            intersection_strategy: self.intersection.name().to_string(),
            retriangulator: self.retriangulator.name().to_string(),
            model_a: model_a.report(),
            model_b: model_b.report(),
        };

        model_a.build(mesh_a, BuildContext::new(keep_front_a, keep_front_b));
        model_b.build(mesh_b, BuildContext::new(keep_front_b, keep_front_a));

        info!(
            ?method,
            triangles = report.total_triangles(),
            rejected = report.model_a.rejections.total() + report.model_b.rejections.total(),
            "boolean combination finished"
        );
        Ok(report)
    }

    /// Cut `model` along `opposite` and retriangulate its faces
    pub fn cut_model(&self, model: &mut Model, opposite: &Model, ctx: &CutContext) {
        model.compute_cut_lines(opposite, ctx, self.intersection.as_ref());
        model.create_vertices(opposite, ctx);
        model.generate_delta_connections(self.retriangulator.as_ref(), ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combiner::BooleanMesh;
    use crate::geometry::{Mesh, Primitive};
    use nalgebra::Vector3;

    fn cube_at(x: f64, y: f64, z: f64) -> Mesh {
        Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false)
            .to_mesh()
            .with_position(Vector3::new(x, y, z))
    }

    #[test]
    fn test_with_precision_validates() {
        assert!(MeshBooleanOperator::with_precision(1e-3).is_ok());
        assert_eq!(
            MeshBooleanOperator::with_precision(0.0).unwrap_err(),
            CombineError::InvalidPrecision(0.0)
        );
        assert!(MeshBooleanOperator::with_precision(f64::NAN).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = CombinerConfig {
            precision: 1e-4,
            intersection: IntersectionMode::Bvh,
        };
        let operator = MeshBooleanOperator::from_config(&config).unwrap();
        assert_eq!(operator.precision(), 1e-4);
        assert!(format!("{:?}", operator).contains("\"bvh\""));
        assert!(format!("{:?}", MeshBooleanOperator::new()).contains("brute-force"));
    }

    #[test]
    fn test_disjoint_union_keeps_everything() {
        let operator = MeshBooleanOperator::with_precision(1e-5).unwrap();
        let mut a = cube_at(0.0, 0.0, 0.0);
        let mut b = cube_at(3.0, 0.0, 0.0);

        let report = operator
            .combine_models(&mut a, &mut b, BooleanOp::Union)
            .unwrap();

        assert_eq!(a.triangle_count(), 12);
        assert_eq!(b.triangle_count(), 12);
        assert_eq!(report.model_a.untouched_faces, 6);
        assert_eq!(report.model_b.cut_lines, 0);
        // Positions are baked relative to the kept translation
        assert_eq!(b.position, Vector3::new(3.0, 0.0, 0.0));
        assert!((b.bounding_box().min.x - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_intersection_is_empty() {
        let operator = MeshBooleanOperator::with_precision(1e-5).unwrap();
        let mut a = cube_at(0.0, 0.0, 0.0);
        let mut b = cube_at(3.0, 0.0, 0.0);

        operator
            .combine_models(&mut a, &mut b, BooleanOp::Intersection)
            .unwrap();
        assert_eq!(a.triangle_count(), 0);
        assert_eq!(b.triangle_count(), 0);
        assert_eq!(a.vertex_count(), 0);
    }

    #[test]
    fn test_invalid_mesh_leaves_both_untouched() {
        let operator = MeshBooleanOperator::new();
        let mut a = cube_at(0.0, 0.0, 0.0);
        let mut b = cube_at(0.5, 0.5, 0.5);
        b.buffer_mut(0).triangles[0].indices[2] = 99;

        let err = operator
            .combine_models(&mut a, &mut b, BooleanOp::Union)
            .unwrap_err();
        assert!(matches!(err, CombineError::IndexOutOfRange { index: 99, .. }));
        assert_eq!(a.triangle_count(), 12);
        assert_eq!(b.triangle_count(), 12);
    }
}
