// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle given by three positions

use super::{BoundingBox, Plane, Segment3};
use nalgebra::{Matrix4, Point3, Vector3};
use parry3d_f64::query::PointQuery;
use parry3d_f64::shape::Triangle;

/// Triangle in space, wound a → b → c
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle3 {
    pub a: Point3<f64>,
    pub b: Point3<f64>,
    pub c: Point3<f64>,
}

impl Triangle3 {
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { a, b, c }
    }

    pub fn points(&self) -> [Point3<f64>; 3] {
        [self.a, self.b, self.c]
    }

    /// Unnormalised normal (b - a) × (c - a)
    pub fn normal(&self) -> Vector3<f64> {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    pub fn plane(&self) -> Plane {
        Plane::from_points(&self.a, &self.b, &self.c)
    }

    pub fn area(&self) -> f64 {
        self.normal().norm() * 0.5
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }

    /// Edges a→b, b→c, c→a
    pub fn edges(&self) -> [Segment3; 3] {
        [
            Segment3::new(self.a, self.b),
            Segment3::new(self.b, self.c),
            Segment3::new(self.c, self.a),
        ]
    }

    /// Same-side test for a point in the triangle's plane; the boundary counts as inside
    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        same_side(point, &self.a, &self.b, &self.c)
            && same_side(point, &self.b, &self.a, &self.c)
            && same_side(point, &self.c, &self.a, &self.b)
    }

    /// Closest point of the (solid) triangle to `point`
    pub fn closest_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Triangle::new(self.a, self.b, self.c)
            .project_local_point(point, true)
            .point
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&[self.a, self.b, self.c])
    }

    pub fn transformed(&self, matrix: &Matrix4<f64>) -> Triangle3 {
        Triangle3::new(
            matrix.transform_point(&self.a),
            matrix.transform_point(&self.b),
            matrix.transform_point(&self.c),
        )
    }
}

/// Whether `p1` and `p2` lie on the same side of the line through `a` and `b`
fn same_side(p1: &Point3<f64>, p2: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> bool {
    let edge = b - a;
    let cp1 = edge.cross(&(p1 - a));
    let cp2 = edge.cross(&(p2 - a));
    cp1.dot(&cp2) >= 0.0
}
