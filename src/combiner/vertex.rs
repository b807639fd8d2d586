// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Working vertices and the per-model vertex arena

use super::host::MeshBufferAccess;
use crate::geometry::MAX_TEX_LAYERS;
use nalgebra::{Matrix4, Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Div, Index, Mul, Sub};

/// Interpolable vertex sample in world space.
///
/// `index` names the source vertex in surface `surface`; vertices created
/// along cut lines have no source and carry `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub surface: usize,
    pub index: Option<u32>,
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    pub tex_coords: [Vector2<f64>; MAX_TEX_LAYERS],
    /// RGBA in 0..=255
    pub color: Vector4<f64>,
    pub fog: f64,
}

impl Vertex {
    /// Copy vertex `index` of `buffer`, transformed into world space
    pub fn from_source<B: MeshBufferAccess + ?Sized>(
        buffer: &B,
        surface: usize,
        index: u32,
        matrix: &Matrix4<f64>,
        normal_matrix: &Matrix4<f64>,
    ) -> Self {
        let normal = buffer.vertex_normal(index);
        let color = buffer.vertex_color(index);
        Self {
            surface,
            index: Some(index),
            position: matrix.transform_point(&buffer.vertex_coord(index)),
            normal: normal_matrix
                .transform_vector(&normal)
                .try_normalize(f64::MIN_POSITIVE)
                .unwrap_or(normal),
            tex_coords: std::array::from_fn(|layer| buffer.vertex_tex_coord(index, layer)),
            color: Vector4::new(
                color[0] as f64,
                color[1] as f64,
                color[2] as f64,
                color[3] as f64,
            ),
            fog: buffer.vertex_fog(index),
        }
    }

    /// Sample the triangle `a b c` at `position` using barycentric weights.
    /// The result has no source index and takes its normal from `a`.
    pub fn interpolate(position: Point3<f64>, a: &Vertex, b: &Vertex, c: &Vertex) -> Vertex {
        let v0 = b.position - a.position;
        let v1 = c.position - a.position;
        let v2 = position - a.position;

        let d00 = v0.dot(&v0);
        let d01 = v0.dot(&v1);
        let d11 = v1.dot(&v1);
        let d20 = v2.dot(&v0);
        let d21 = v2.dot(&v1);
        let denom = d00 * d11 - d01 * d01;

        let mut vertex = if denom.abs() <= f64::EPSILON * d00 * d11 {
            *a
        } else {
            let v = (d11 * d20 - d01 * d21) / denom;
            let w = (d00 * d21 - d01 * d20) / denom;
            *a * (1.0 - v - w) + *b * v + *c * w
        };

        vertex.surface = a.surface;
        vertex.index = None;
        vertex.position = position;
        vertex.normal = a.normal;
        vertex
    }

    /// Color rounded back to 8 bit channels
    pub fn color_bytes(&self) -> [u8; 4] {
        let c = self.color.map(|v| v.round().clamp(0.0, 255.0) as u8);
        [c.x, c.y, c.z, c.w]
    }
}

/// Component-wise arithmetic on every interpolable attribute; surface and
/// index come from the left operand.
macro_rules! vertex_operator {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<Vertex> for Vertex {
            type Output = Vertex;

            fn $method(self, other: Vertex) -> Vertex {
                Vertex {
                    surface: self.surface,
                    index: self.index,
                    position: Point3::from(self.position.coords.zip_map(&other.position.coords, |a, b| a $op b)),
                    normal: self.normal.zip_map(&other.normal, |a, b| a $op b),
                    tex_coords: std::array::from_fn(|i| {
                        self.tex_coords[i].zip_map(&other.tex_coords[i], |a, b| a $op b)
                    }),
                    color: self.color.zip_map(&other.color, |a, b| a $op b),
                    fog: self.fog $op other.fog,
                }
            }
        }

        impl $trait<f64> for Vertex {
            type Output = Vertex;

            fn $method(self, size: f64) -> Vertex {
                Vertex {
                    surface: self.surface,
                    index: self.index,
                    position: Point3::from(self.position.coords.map(|a| a $op size)),
                    normal: self.normal.map(|a| a $op size),
                    tex_coords: self.tex_coords.map(|t| t.map(|a| a $op size)),
                    color: self.color.map(|a| a $op size),
                    fog: self.fog $op size,
                }
            }
        }
    };
}

vertex_operator!(Add, add, +);
vertex_operator!(Sub, sub, -);
vertex_operator!(Mul, mul, *);
vertex_operator!(Div, div, /);

/// Handle to a vertex stored in a [`VertexPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// Arena owning every working vertex of one model
#[derive(Debug, Clone, Default)]
pub struct VertexPool {
    vertices: Vec<Vertex>,
}

impl VertexPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, vertex: Vertex) -> VertexId {
        self.vertices.push(vertex);
        VertexId(self.vertices.len() - 1)
    }

    pub fn get(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    pub fn position(&self, id: VertexId) -> Point3<f64> {
        self.vertices[id.0].position
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl Index<VertexId> for VertexPool {
    type Output = Vertex;

    fn index(&self, id: VertexId) -> &Vertex {
        self.get(id)
    }
}
