// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh contract the combiner reads from and writes back into

use crate::geometry::Triangle3;
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector2, Vector3};

/// One surface of a host mesh.
///
/// Vertex getters may panic on an out-of-range index; the combiner validates
/// every triangle index before it reads any vertex.
pub trait MeshBufferAccess {
    fn triangle_count(&self) -> usize;

    fn triangle_indices(&self, index: usize) -> [u32; 3];

    /// Local-space corners of triangle `index`
    fn triangle_coords(&self, index: usize) -> Triangle3 {
        let [a, b, c] = self.triangle_indices(index);
        Triangle3::new(self.vertex_coord(a), self.vertex_coord(b), self.vertex_coord(c))
    }

    fn vertex_count(&self) -> usize;

    fn vertex_coord(&self, index: u32) -> Point3<f64>;

    fn vertex_normal(&self, index: u32) -> Vector3<f64>;

    fn vertex_color(&self, index: u32) -> [u8; 4];

    fn vertex_fog(&self, index: u32) -> f64;

    fn vertex_tex_coord(&self, index: u32, layer: usize) -> Vector2<f64>;

    /// Drop every triangle; vertices stay
    fn clear_indices(&mut self);

    fn add_vertex(
        &mut self,
        position: Point3<f64>,
        normal: Vector3<f64>,
        tex_coord: Vector2<f64>,
        color: [u8; 4],
        fog: f64,
    ) -> u32;

    fn set_vertex_tex_coord(&mut self, index: u32, tex_coord: Vector2<f64>, layer: usize);

    fn add_triangle(&mut self, a: u32, b: u32, c: u32);
}

/// Host mesh made of surfaces and a world transform
pub trait BooleanMesh {
    type Buffer: MeshBufferAccess;

    fn buffer_count(&self) -> usize;

    fn buffer(&self, index: usize) -> &Self::Buffer;

    fn buffer_mut(&mut self, index: usize) -> &mut Self::Buffer;

    /// Local to world transform
    fn transform_matrix(&self) -> Matrix4<f64>;

    /// Translation part of [`BooleanMesh::transform_matrix`]
    fn translation(&self) -> Vector3<f64> {
        self.transform_matrix().fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Called once the index lists have been rebuilt
    fn update_mesh_buffer(&mut self);

    fn set_rotation(&mut self, rotation: UnitQuaternion<f64>);

    fn set_scale(&mut self, scale: Vector3<f64>);
}
