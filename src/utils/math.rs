// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};
use std::cmp::Ordering;

/// Calculate the unit normal of a triangle given three vertices.
/// Degenerate triangles yield the zero vector.
pub fn calculate_triangle_normal(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
) -> Vector3<f64> {
    let v1 = p1 - p0;
    let v2 = p2 - p0;
    v1.cross(&v2)
        .try_normalize(f64::MIN_POSITIVE)
        .unwrap_or_else(Vector3::zeros)
}

/// Check if two floats are approximately equal
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Component-wise equality of two points within epsilon
pub fn points_equal(a: &Point3<f64>, b: &Point3<f64>, epsilon: f64) -> bool {
    approx_eq(a.x, b.x, epsilon) && approx_eq(a.y, b.y, epsilon) && approx_eq(a.z, b.z, epsilon)
}

/// Component-wise equality of two vectors within epsilon
pub fn vectors_equal(a: &Vector3<f64>, b: &Vector3<f64>, epsilon: f64) -> bool {
    approx_eq(a.x, b.x, epsilon) && approx_eq(a.y, b.y, epsilon) && approx_eq(a.z, b.z, epsilon)
}

/// Lexicographic total order on points (x, then y, then z)
pub fn cmp_points(a: &Point3<f64>, b: &Point3<f64>) -> Ordering {
    a.x.total_cmp(&b.x)
        .then_with(|| a.y.total_cmp(&b.y))
        .then_with(|| a.z.total_cmp(&b.z))
}
