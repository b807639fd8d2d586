// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Line segment queries backed by parry3d

use nalgebra::{Point3, Vector3};
use parry3d_f64::query::details::closest_points_segment_segment_with_locations_nD;
use parry3d_f64::query::PointQuery;
use parry3d_f64::shape::Segment;

/// Segment between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment3 {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Segment3 {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.start, &self.end)
    }

    pub fn direction(&self) -> Vector3<f64> {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Euclidean distance from `point` to the closest point of the segment
    pub fn point_distance(&self, point: &Point3<f64>) -> f64 {
        Segment::new(self.start, self.end).distance_to_local_point(point, true)
    }

    /// Closest points between two segments, the first on `self`
    pub fn closest_points(&self, other: &Segment3) -> (Point3<f64>, Point3<f64>) {
        let seg1 = Segment::new(self.start, self.end);
        let seg2 = Segment::new(other.start, other.end);
        let (loc1, loc2) = closest_points_segment_segment_with_locations_nD(
            (&seg1.a, &seg1.b),
            (&seg2.a, &seg2.b),
        );
        (seg1.point_at(&loc1), seg2.point_at(&loc2))
    }

    /// Whether `point` is no farther from either endpoint than the segment is long.
    /// For points on the supporting line this means lying between the endpoints.
    pub fn is_between(&self, point: &Point3<f64>) -> bool {
        let length_sq = self.direction().norm_squared();
        (point - self.start).norm_squared() <= length_sq
            && (point - self.end).norm_squared() <= length_sq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_distance_clamps_to_endpoints() {
        let seg = Segment3::new(Point3::origin(), Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(seg.point_distance(&Point3::new(1.0, 1.0, 0.0)), 1.0);
        assert_relative_eq!(seg.point_distance(&Point3::new(3.0, 0.0, 0.0)), 1.0);
        assert_relative_eq!(seg.center(), Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_closest_points_of_crossing_segments() {
        let a = Segment3::new(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        let b = Segment3::new(Point3::new(0.0, -1.0, 1.0), Point3::new(0.0, 1.0, 1.0));
        let (p, q) = a.closest_points(&b);
        assert_relative_eq!(p, Point3::origin(), epsilon = 1e-12);
        assert_relative_eq!(q, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_is_between() {
        let seg = Segment3::new(Point3::new(1.0, 1.0, 0.0), Point3::new(0.0, 0.0, 0.0));
        assert!(seg.is_between(&Point3::new(0.5, 0.5, 0.0)));
        assert!(!seg.is_between(&Point3::new(1.5, 1.5, 0.0)));
    }
}
