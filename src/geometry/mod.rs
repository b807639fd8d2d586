// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - meshes, primitives and the geometric kernel

mod bbox;
mod boolean;
mod bvh;
mod mesh;
mod parallel;
mod plane;
mod primitives;
mod segment;
mod triangle3;
pub mod triangle_intersection;

pub use bbox::BoundingBox;
pub use boolean::{perform_boolean_operation, perform_boolean_operation_with, BooleanOp};
pub use bvh::{BVHNode, BVH};
pub use mesh::{Mesh, MeshBuffer, Triangle, Vertex, MAX_TEX_LAYERS};
pub use parallel::ParallelBooleanExecutor;
pub use plane::Plane;
pub use primitives::Primitive;
pub use segment::Segment3;
pub use triangle3::Triangle3;
