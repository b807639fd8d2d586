// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Oriented plane in Hessian normal form

use crate::utils::math::{approx_eq, calculate_triangle_normal, vectors_equal};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Plane `normal · p = distance`, with `normal` of unit length.
///
/// Points with positive signed distance lie in front of the plane, i.e. on
/// the side the normal points to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub distance: f64,
}

impl Plane {
    pub fn new(normal: Vector3<f64>, distance: f64) -> Self {
        Self { normal, distance }
    }

    /// Plane through three points, oriented counter-clockwise: normal = (b - a) × (c - a)
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Self {
        let normal = calculate_triangle_normal(a, b, c);
        Self {
            normal,
            distance: normal.dot(&a.coords),
        }
    }

    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.distance
    }

    /// Same plane facing the other way
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            distance: -self.distance,
        }
    }

    /// Equal within `epsilon` on the distance and on every normal component
    pub fn approx_eq(&self, other: &Plane, epsilon: f64) -> bool {
        approx_eq(self.distance, other.distance, epsilon)
            && vectors_equal(&self.normal, &other.normal, epsilon)
    }

    /// Total order used to bring coplanar triangles next to each other:
    /// distance first, then normal x, y, z.
    pub fn total_cmp(&self, other: &Plane) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.normal.x.total_cmp(&other.normal.x))
            .then_with(|| self.normal.y.total_cmp(&other.normal.y))
            .then_with(|| self.normal.z.total_cmp(&other.normal.z))
    }
}
