// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Combiner
//!
//! Constructive solid geometry for closed triangle meshes. Two meshes are cut
//! along their mutual intersection and each keeps the part of its surface
//! that belongs to the union, difference or intersection of the solids.
//!
//! ```no_run
//! use nalgebra::Vector3;
//! use polyframe_combiner::{BooleanOp, MeshBooleanOperator, Primitive};
//!
//! let mut a = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
//! let mut b = Primitive::sphere(0.6, 24).to_mesh().with_position(Vector3::new(1.0, 1.0, 1.0));
//!
//! let operator = MeshBooleanOperator::new();
//! let report = operator.combine_models(&mut a, &mut b, BooleanOp::Difference)?;
//! a.merge(&b);
//! println!("{} triangles", report.total_triangles());
//! # Ok::<(), polyframe_combiner::CombineError>(())
//! ```

pub mod combiner;
pub mod config;
pub mod error;
pub mod geometry;
pub mod utils;

pub use combiner::{BooleanMesh, CombineReport, MeshBooleanOperator, MeshBufferAccess};
pub use config::CombinerConfig;
pub use error::{CombineError, CombineResult};
pub use geometry::{
    perform_boolean_operation, BooleanOp, Mesh, MeshBuffer, ParallelBooleanExecutor, Primitive,
};
