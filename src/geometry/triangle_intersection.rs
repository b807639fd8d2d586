// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle-triangle intersection
//! Produces the segment along which two non-coplanar triangles cross

use super::{Plane, Segment3, Triangle3};
use nalgebra::Point3;

/// Result of triangle-triangle intersection test
#[derive(Debug, Clone)]
pub struct IntersectionResult {
    /// Intersection type
    pub intersection_type: IntersectionType,
    /// Distinct piercing points (edges of one triangle through the other)
    pub intersection_points: Vec<Point3<f64>>,
}

/// Type of triangle-triangle intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionType {
    /// No intersection
    None,
    /// Triangles lie in the same plane; no segment is produced
    Coplanar,
    /// Triangles touch at a single point
    Point,
    /// Triangles intersect along a line segment
    Segment,
}

/// Classify how two triangles intersect. Points closer than `epsilon` are merged.
pub fn triangle_triangle_intersection(
    tri_a: &Triangle3,
    tri_b: &Triangle3,
    epsilon: f64,
) -> IntersectionResult {
    let plane_a = tri_a.plane();
    let plane_b = tri_b.plane();

    if are_triangles_coplanar(&plane_a, tri_b, epsilon) {
        return IntersectionResult {
            intersection_type: IntersectionType::Coplanar,
            intersection_points: Vec::new(),
        };
    }

    let mut intersection_points = Vec::new();

    for edge in tri_a.edges() {
        if let Some(point) = edge_triangle_intersection(&edge, tri_b, &plane_b, epsilon) {
            intersection_points.push(point);
        }
    }
    for edge in tri_b.edges() {
        if let Some(point) = edge_triangle_intersection(&edge, tri_a, &plane_a, epsilon) {
            intersection_points.push(point);
        }
    }

    let intersection_points = deduplicate_points(&intersection_points, epsilon);

    let intersection_type = match intersection_points.len() {
        0 => IntersectionType::None,
        1 => IntersectionType::Point,
        _ => IntersectionType::Segment,
    };

    IntersectionResult {
        intersection_type,
        intersection_points,
    }
}

/// Segment shared by both triangles, if they cross along more than a point.
/// With more than two piercing points the two farthest apart are used.
pub fn intersection_segment(tri_a: &Triangle3, tri_b: &Triangle3, epsilon: f64) -> Option<Segment3> {
    let result = triangle_triangle_intersection(tri_a, tri_b, epsilon);
    if result.intersection_type != IntersectionType::Segment {
        return None;
    }

    let points = &result.intersection_points;
    let mut best: Option<(f64, usize, usize)> = None;
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let dist = (points[i] - points[j]).norm_squared();
            if best.map_or(true, |(d, _, _)| dist > d) {
                best = Some((dist, i, j));
            }
        }
    }

    best.map(|(_, i, j)| Segment3::new(points[i], points[j]))
}

/// Parallel planes never produce a segment, so they are handled as coplanar too
fn are_triangles_coplanar(plane_a: &Plane, tri_b: &Triangle3, epsilon: f64) -> bool {
    let plane_b = tri_b.plane();
    if plane_a.normal.cross(&plane_b.normal).norm() <= epsilon {
        return true;
    }
    tri_b
        .points()
        .iter()
        .all(|p| plane_a.signed_distance(p).abs() <= epsilon)
}

/// Point where `edge` pierces `triangle`, if any. Edges lying in the plane are skipped.
fn edge_triangle_intersection(
    edge: &Segment3,
    triangle: &Triangle3,
    plane: &Plane,
    epsilon: f64,
) -> Option<Point3<f64>> {
    let start_dist = plane.signed_distance(&edge.start);
    let end_dist = plane.signed_distance(&edge.end);

    let start_on = start_dist.abs() <= epsilon;
    let end_on = end_dist.abs() <= epsilon;

    let intersection = match (start_on, end_on) {
        (true, true) => return None,
        (true, false) => edge.start,
        (false, true) => edge.end,
        (false, false) => {
            if start_dist * end_dist > 0.0 {
                return None;
            }
            let t = start_dist / (start_dist - end_dist);
            edge.start + edge.direction() * t
        }
    };

    if (triangle.closest_point(&intersection) - intersection).norm() <= epsilon {
        Some(intersection)
    } else {
        None
    }
}

/// Deduplicate points within epsilon distance
fn deduplicate_points(points: &[Point3<f64>], epsilon: f64) -> Vec<Point3<f64>> {
    let mut result: Vec<Point3<f64>> = Vec::new();

    for &point in points {
        if !result.iter().any(|existing| (point - existing).norm() <= epsilon) {
            result.push(point);
        }
    }

    result
}
