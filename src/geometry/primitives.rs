// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator
//!
//! Every primitive is closed and wound counter-clockwise when seen from
//! outside, so triangle normals point away from the enclosed volume.

use super::{Mesh, MeshBuffer, Triangle, Vertex};
use nalgebra::{Point3, Vector2, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Sphere { r: f64, fn_: u32 },
    Cylinder { h: f64, r: f64, fn_: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn sphere(r: f64, fn_: u32) -> Self {
        let segments = if fn_ > 2 { fn_ } else { 32 };
        Self::Sphere { r, fn_: segments }
    }

    pub fn cylinder(h: f64, r: f64, fn_: u32) -> Self {
        let segments = if fn_ > 2 { fn_ } else { 32 };
        Self::Cylinder {
            h,
            r,
            fn_: segments,
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        let buffer = match self {
            Self::Cube { size, center } => generate_cube(*size, *center),
            Self::Sphere { r, fn_ } => generate_sphere(*r, *fn_),
            Self::Cylinder { h, r, fn_ } => generate_cylinder(*h, *r, *fn_),
        };
        Mesh::from_buffer(buffer)
    }
}

/// 24 vertices, four per side, so every side is its own coplanar group
fn generate_cube(size: Vector3<f64>, center: bool) -> MeshBuffer {
    let mut buffer = MeshBuffer::with_capacity(24, 12);
    let offset = if center { size / 2.0 } else { Vector3::zeros() };

    // Unit corners per side, counter-clockwise seen from outside
    let sides: [([[f64; 3]; 4], Vector3<f64>); 6] = [
        ([[1., 0., 0.], [1., 1., 0.], [1., 1., 1.], [1., 0., 1.]], Vector3::x()),
        ([[0., 0., 0.], [0., 0., 1.], [0., 1., 1.], [0., 1., 0.]], -Vector3::x()),
        ([[0., 1., 0.], [0., 1., 1.], [1., 1., 1.], [1., 1., 0.]], Vector3::y()),
        ([[0., 0., 0.], [1., 0., 0.], [1., 0., 1.], [0., 0., 1.]], -Vector3::y()),
        ([[0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.]], Vector3::z()),
        ([[0., 0., 0.], [0., 1., 0.], [1., 1., 0.], [1., 0., 0.]], -Vector3::z()),
    ];
    let uvs = [
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(0.0, 1.0),
    ];

    for (corners, normal) in sides {
        let base = buffer.vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(uvs) {
            let position = Point3::new(
                corner[0] * size.x - offset.x,
                corner[1] * size.y - offset.y,
                corner[2] * size.z - offset.z,
            );
            buffer.push_vertex(Vertex::new(position, normal).with_tex_coord(uv));
        }
        buffer.push_triangle(Triangle::new([base, base + 1, base + 2]));
        buffer.push_triangle(Triangle::new([base, base + 2, base + 3]));
    }

    buffer
}

fn generate_sphere(radius: f64, segments: u32) -> MeshBuffer {
    let mut buffer = MeshBuffer::new();
    let stacks = segments;
    let slices = segments;

    for i in 0..=stacks {
        let phi = PI * i as f64 / stacks as f64;
        let y = radius * phi.cos();
        let r = radius * phi.sin();

        for j in 0..=slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            let x = r * theta.cos();
            let z = r * theta.sin();

            let normal = Vector3::new(x, y, z)
                .try_normalize(f64::MIN_POSITIVE)
                .unwrap_or_else(|| Vector3::new(0.0, y.signum(), 0.0));
            let uv = Vector2::new(j as f64 / slices as f64, i as f64 / stacks as f64);
            buffer.push_vertex(Vertex::new(Point3::new(x, y, z), normal).with_tex_coord(uv));
        }
    }

    // The first and last rings collapse into the poles; skip the zero-area halves there
    for i in 0..stacks {
        for j in 0..slices {
            let first = i * (slices + 1) + j;
            let second = first + slices + 1;

            if i > 0 {
                buffer.push_triangle(Triangle::new([first, first + 1, second]));
            }
            if i + 1 < stacks {
                buffer.push_triangle(Triangle::new([second, first + 1, second + 1]));
            }
        }
    }

    buffer
}

/// Cylinder along +z from z = 0 to z = height, caps and sides with separate vertices
fn generate_cylinder(height: f64, radius: f64, segments: u32) -> MeshBuffer {
    let mut buffer = MeshBuffer::new();

    let bottom_center = buffer.push_vertex(Vertex::new(Point3::origin(), -Vector3::z()));
    let top_center = buffer.push_vertex(Vertex::new(Point3::new(0.0, 0.0, height), Vector3::z()));

    let mut bottom_cap = Vec::with_capacity(segments as usize);
    let mut top_cap = Vec::with_capacity(segments as usize);
    let mut bottom_side = Vec::with_capacity(segments as usize);
    let mut top_side = Vec::with_capacity(segments as usize);

    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        let radial = Vector3::new(cos, sin, 0.0);
        let bottom = Point3::new(radius * cos, radius * sin, 0.0);
        let top = Point3::new(radius * cos, radius * sin, height);

        bottom_cap.push(buffer.push_vertex(Vertex::new(bottom, -Vector3::z())));
        top_cap.push(buffer.push_vertex(Vertex::new(top, Vector3::z())));
        bottom_side.push(buffer.push_vertex(Vertex::new(bottom, radial)));
        top_side.push(buffer.push_vertex(Vertex::new(top, radial)));
    }

    let count = segments as usize;
    for i in 0..count {
        let next = (i + 1) % count;

        buffer.push_triangle(Triangle::new([bottom_center, bottom_cap[next], bottom_cap[i]]));
        buffer.push_triangle(Triangle::new([top_center, top_cap[i], top_cap[next]]));

        let (bi, bn) = (bottom_side[i], bottom_side[next]);
        let (ti, tn) = (top_side[i], top_side[next]);
        buffer.push_triangle(Triangle::new([bi, bn, ti]));
        buffer.push_triangle(Triangle::new([ti, bn, tn]));
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Divergence theorem: a closed, outward-wound mesh has positive signed volume
    fn signed_volume(mesh: &Mesh) -> f64 {
        mesh.world_triangles()
            .iter()
            .map(|t| t.a.coords.dot(&t.b.coords.cross(&t.c.coords)) / 6.0)
            .sum()
    }

    #[test]
    fn test_cube_generation() {
        let mesh = Primitive::cube(Vector3::new(2.0, 3.0, 4.0), false).to_mesh();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_relative_eq!(signed_volume(&mesh), 24.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cube_triangle_normals_match_vertex_normals() {
        let mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_mesh();
        let buffer = &mesh.buffers[0];
        for tri in &buffer.triangles {
            let [a, b, c] = tri.indices.map(|i| buffer.vertices[i as usize]);
            let normal = (b.position - a.position)
                .cross(&(c.position - a.position))
                .normalize();
            assert_relative_eq!(normal, a.normal, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sphere_is_outward() {
        let mesh = Primitive::sphere(1.0, 16).to_mesh();
        let volume = signed_volume(&mesh);
        assert!(volume > 3.5 && volume < 4.0 * PI / 3.0 + 1e-9);
        assert!(mesh.world_triangles().iter().all(|t| t.area() > 0.0));
    }

    #[test]
    fn test_cylinder_is_outward() {
        let mesh = Primitive::cylinder(2.0, 1.0, 32).to_mesh();
        let volume = signed_volume(&mesh);
        assert!(volume > 0.0 && volume < 2.0 * PI);
        assert_eq!(mesh.triangle_count(), 32 * 4);
    }
}
