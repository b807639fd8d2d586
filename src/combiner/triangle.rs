// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Original and retriangulated triangles, with the collision tests the
//! retriangulation relies on

use super::line::check_line_line_intersection;
use super::line::line_line_intersection;
use super::vertex::VertexId;
use crate::geometry::{Plane, Segment3, Triangle3};
use crate::utils::math::{points_equal, vectors_equal};
use nalgebra::{Point3, Vector3};

/// Index of a face inside its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceId(pub usize);

/// Read-only mirror of one source triangle
#[derive(Debug, Clone)]
pub struct Triangle {
    pub surface: usize,
    pub indices: [u32; 3],
    /// World-space corners
    pub coords: Triangle3,
    pub plane: Plane,
    pub face: FaceId,
}

impl Triangle {
    pub fn new(surface: usize, indices: [u32; 3], coords: Triangle3) -> Self {
        Self {
            surface,
            indices,
            coords,
            plane: coords.plane(),
            face: FaceId(0),
        }
    }
}

/// Triangle accepted into a face's retriangulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalTriangle {
    pub vertices: [VertexId; 3],
    pub coords: Triangle3,
}

/// Unit normal of `triangle` equals `normal` within `epsilon`
pub fn check_normal_equality(triangle: &Triangle3, normal: &Vector3<f64>, epsilon: f64) -> bool {
    match triangle.normal().try_normalize(f64::MIN_POSITIVE) {
        Some(n) => vectors_equal(&n, normal, epsilon),
        None => false,
    }
}

/// Corner, edge or overlap contact between two coplanar triangles
pub fn check_collision(a: &Triangle3, b: &Triangle3, epsilon: f64) -> bool {
    check_collision_corners(a, b, epsilon)
        || check_collision_edges(a, b, epsilon)
        || check_collision_overlap(a, b, epsilon)
}

/// Same triangle (in any rotation of the same winding), or a corner of one
/// strictly inside the other
pub fn check_collision_corners(a: &Triangle3, b: &Triangle3, epsilon: f64) -> bool {
    let [a1, b1, c1] = a.points();
    let [a2, b2, c2] = b.points();
    let eq = |p: &Point3<f64>, q: &Point3<f64>| points_equal(p, q, epsilon);

    if (eq(&a1, &a2) && eq(&b1, &b2) && eq(&c1, &c2))
        || (eq(&a1, &b2) && eq(&b1, &c2) && eq(&c1, &a2))
        || (eq(&a1, &c2) && eq(&b1, &a2) && eq(&c1, &b2))
    {
        return true;
    }

    b.points().iter().any(|p| check_point_inside(a, p, epsilon))
        || a.points().iter().any(|p| check_point_inside(b, p, epsilon))
}

/// Proper crossing of any edge pair; shared corners do not count
pub fn check_collision_edges(a: &Triangle3, b: &Triangle3, epsilon: f64) -> bool {
    let edges_b = b.edges();
    a.edges().iter().any(|edge_a| {
        edges_b
            .iter()
            .any(|edge_b| check_line_line_intersection(edge_a, edge_b, epsilon))
    })
}

/// Center of either triangle strictly inside the other
pub fn check_collision_overlap(a: &Triangle3, b: &Triangle3, epsilon: f64) -> bool {
    check_point_inside(a, &b.center(), epsilon) || check_point_inside(b, &a.center(), epsilon)
}

/// `line` coincides with one of the triangle's edges, in either direction
pub fn check_line_edges_contact(triangle: &Triangle3, line: &Segment3, epsilon: f64) -> bool {
    triangle.edges().iter().any(|edge| {
        let forward = points_equal(&edge.start, &line.start, epsilon)
            && points_equal(&edge.end, &line.end, epsilon);
        let backward = points_equal(&edge.start, &line.end, epsilon)
            && points_equal(&edge.end, &line.start, epsilon);
        forward || backward
    })
}

/// Append the points where `line` meets the triangle's edges
pub fn line_edges_intersection(
    triangle: &Triangle3,
    line: &Segment3,
    epsilon: f64,
    points: &mut Vec<Point3<f64>>,
) {
    for edge in triangle.edges() {
        if let Some(point) = line_line_intersection(line, &edge, epsilon) {
            points.push(point);
        }
    }
}

/// `point` coincides with a corner of `triangle`
pub fn check_point_corners_contact(triangle: &Triangle3, point: &Point3<f64>, epsilon: f64) -> bool {
    triangle
        .points()
        .iter()
        .any(|corner| points_equal(corner, point, epsilon))
}

/// Strict containment: inside and farther than `epsilon` from every corner and edge
pub fn check_point_inside(triangle: &Triangle3, point: &Point3<f64>, epsilon: f64) -> bool {
    triangle.contains_point(point)
        && !check_point_corners_contact(triangle, point, epsilon)
        && triangle
            .edges()
            .iter()
            .all(|edge| edge.point_distance(point) > epsilon)
}

/// Inclusive containment: inside, or within `epsilon` of an edge
pub fn check_point_inside_inv(triangle: &Triangle3, point: &Point3<f64>, epsilon: f64) -> bool {
    triangle.contains_point(point)
        || triangle
            .edges()
            .iter()
            .any(|edge| edge.point_distance(point) < epsilon)
}
