// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::{BooleanOp, BoundingBox, Triangle3};
use crate::combiner::{BooleanMesh, MeshBufferAccess};
use crate::error::CombineResult;
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Number of texture coordinate layers carried per vertex
pub const MAX_TEX_LAYERS: usize = 8;

/// Vertex with position, normal and surface attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    pub tex_coords: [Vector2<f64>; MAX_TEX_LAYERS],
    pub color: [u8; 4],
    pub fog: f64,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal,
            tex_coords: [Vector2::zeros(); MAX_TEX_LAYERS],
            color: [255; 4],
            fog: 0.0,
        }
    }

    pub fn with_tex_coord(mut self, tex_coord: Vector2<f64>) -> Self {
        self.tex_coords[0] = tex_coord;
        self
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.position = matrix.transform_point(&self.position);
        // Transform normal (use inverse transpose for normals)
        let normal_matrix = matrix
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(*matrix);
        self.normal = normal_matrix
            .transform_vector(&self.normal)
            .try_normalize(f64::MIN_POSITIVE)
            .unwrap_or(self.normal);
    }
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [u32; 3],
}

impl Triangle {
    pub fn new(indices: [u32; 3]) -> Self {
        Self { indices }
    }
}

/// One surface of a mesh: a vertex list and an index list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffer {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl MeshBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Add a vertex and return its index
    pub fn push_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle
    pub fn push_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Transform all vertices by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            vertex.transform(matrix);
        }
    }

    /// Remove orphaned vertices (vertices not referenced by any triangle)
    /// Returns the number of vertices removed
    pub fn remove_orphaned_vertices(&mut self) -> usize {
        if self.triangles.is_empty() {
            let removed = self.vertices.len();
            self.vertices.clear();
            return removed;
        }

        let mut used_vertices = vec![false; self.vertices.len()];
        for triangle in &self.triangles {
            for &index in &triangle.indices {
                if let Some(used) = used_vertices.get_mut(index as usize) {
                    *used = true;
                }
            }
        }

        // Build remapping: old_index -> new_index
        let mut new_indices = vec![0u32; self.vertices.len()];
        let mut new_vertices = Vec::with_capacity(self.vertices.len());

        for (old_idx, &used) in used_vertices.iter().enumerate() {
            if used {
                new_indices[old_idx] = new_vertices.len() as u32;
                new_vertices.push(self.vertices[old_idx]);
            }
        }

        for triangle in &mut self.triangles {
            for index in &mut triangle.indices {
                if let Some(&mapped) = new_indices.get(*index as usize) {
                    *index = mapped;
                }
            }
        }

        let removed = self.vertices.len() - new_vertices.len();
        self.vertices = new_vertices;
        removed
    }
}

impl MeshBufferAccess for MeshBuffer {
    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn triangle_indices(&self, index: usize) -> [u32; 3] {
        self.triangles[index].indices
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn vertex_coord(&self, index: u32) -> Point3<f64> {
        self.vertices[index as usize].position
    }

    fn vertex_normal(&self, index: u32) -> Vector3<f64> {
        self.vertices[index as usize].normal
    }

    fn vertex_color(&self, index: u32) -> [u8; 4] {
        self.vertices[index as usize].color
    }

    fn vertex_fog(&self, index: u32) -> f64 {
        self.vertices[index as usize].fog
    }

    fn vertex_tex_coord(&self, index: u32, layer: usize) -> Vector2<f64> {
        self.vertices[index as usize]
            .tex_coords
            .get(layer)
            .copied()
            .unwrap_or_else(Vector2::zeros)
    }

    fn clear_indices(&mut self) {
        self.triangles.clear();
    }

    fn add_vertex(
        &mut self,
        position: Point3<f64>,
        normal: Vector3<f64>,
        tex_coord: Vector2<f64>,
        color: [u8; 4],
        fog: f64,
    ) -> u32 {
        let mut vertex = Vertex::new(position, normal).with_tex_coord(tex_coord);
        vertex.color = color;
        vertex.fog = fog;
        self.push_vertex(vertex)
    }

    fn set_vertex_tex_coord(&mut self, index: u32, tex_coord: Vector2<f64>, layer: usize) {
        if let Some(slot) = self
            .vertices
            .get_mut(index as usize)
            .and_then(|v| v.tex_coords.get_mut(layer))
        {
            *slot = tex_coord;
        }
    }

    fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.push_triangle(Triangle::new([a, b, c]));
    }
}

/// Triangular mesh made of one or more surfaces plus a translation/rotation/scale transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub buffers: Vec<MeshBuffer>,
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub scale: Vector3<f64>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            buffers: Vec::new(),
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }

    pub fn from_buffer(buffer: MeshBuffer) -> Self {
        let mut mesh = Self::new();
        mesh.buffers.push(buffer);
        mesh
    }

    /// Append a surface and return its index
    pub fn add_buffer(&mut self, buffer: MeshBuffer) -> usize {
        self.buffers.push(buffer);
        self.buffers.len() - 1
    }

    pub fn set_position(&mut self, position: Vector3<f64>) {
        self.position = position;
    }

    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.buffers.iter().map(|b| b.vertices.len()).sum()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.buffers.iter().map(|b| b.triangles.len()).sum()
    }

    /// Model matrix: translation * rotation * scale
    pub fn model_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// All triangles of every surface in world space
    pub fn world_triangles(&self) -> Vec<Triangle3> {
        let matrix = self.model_matrix();
        self.buffers
            .iter()
            .flat_map(|buffer| {
                buffer.triangles.iter().map(move |tri| {
                    let [a, b, c] = tri.indices.map(|i| buffer.vertices[i as usize].position);
                    Triangle3::new(a, b, c)
                })
            })
            .map(|tri| tri.transformed(&matrix))
            .collect()
    }

    /// Compute world-space bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        let matrix = self.model_matrix();
        let mut bbox = BoundingBox::empty();
        for vertex in self.buffers.iter().flat_map(|b| b.vertices.iter()) {
            bbox.expand_to_include(&matrix.transform_point(&vertex.position));
        }
        bbox
    }

    /// Merge with another mesh (simple union without CSG). The other mesh's
    /// surfaces are re-expressed in this mesh's local frame and appended.
    pub fn merge(&mut self, other: &Mesh) {
        let to_local = self
            .model_matrix()
            .try_inverse()
            .unwrap_or_else(Matrix4::identity)
            * other.model_matrix();

        for buffer in &other.buffers {
            let mut buffer = buffer.clone();
            if to_local != Matrix4::identity() {
                buffer.transform(&to_local);
            }
            self.buffers.push(buffer);
        }
    }

    /// Perform a boolean operation with another mesh, leaving both inputs untouched
    pub fn boolean_operation(&self, other: &Mesh, op: BooleanOp) -> CombineResult<Mesh> {
        super::boolean::perform_boolean_operation(self, other, op)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl BooleanMesh for Mesh {
    type Buffer = MeshBuffer;

    fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn buffer(&self, index: usize) -> &MeshBuffer {
        &self.buffers[index]
    }

    fn buffer_mut(&mut self, index: usize) -> &mut MeshBuffer {
        &mut self.buffers[index]
    }

    fn transform_matrix(&self) -> Matrix4<f64> {
        self.model_matrix()
    }

    /// Drops vertices that the rebuilt index lists no longer reference
    fn update_mesh_buffer(&mut self) {
        for buffer in &mut self.buffers {
            buffer.remove_orphaned_vertices();
        }
    }

    fn set_rotation(&mut self, rotation: UnitQuaternion<f64>) {
        self.rotation = rotation;
    }

    fn set_scale(&mut self, scale: Vector3<f64>) {
        self.scale = scale;
    }
}
