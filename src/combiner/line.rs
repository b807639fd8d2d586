// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cut lines and segment-segment contact tests

use super::triangle::{check_point_inside, FaceId};
use super::vertex::{VertexId, VertexPool};
use crate::geometry::{Plane, Segment3, Triangle3};
use crate::utils::math::{points_equal, vectors_equal};
use nalgebra::Point3;
use std::ops::BitOr;

/// Segment where a face's plane crosses an opposing triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutLine {
    pub a: VertexId,
    pub b: VertexId,
    /// Cached endpoint positions of `a` and `b`
    pub segment: Segment3,
    /// Plane of the opposing triangle
    pub plane: Plane,
    pub face: FaceId,
}

impl CutLine {
    pub fn new(a: VertexId, b: VertexId, pool: &VertexPool, plane: Plane, face: FaceId) -> Self {
        Self {
            a,
            b,
            segment: Segment3::new(pool.position(a), pool.position(b)),
            plane,
            face,
        }
    }

    /// Replace the endpoints, refreshing the cached segment
    pub fn set_endpoints(&mut self, a: VertexId, b: VertexId, pool: &VertexPool) {
        self.a = a;
        self.b = b;
        self.segment = Segment3::new(pool.position(a), pool.position(b));
    }

    /// Same opposing plane and parallel direction
    pub fn check_redundance(&self, other: &CutLine, epsilon: f64) -> bool {
        if !self.plane.approx_eq(&other.plane, epsilon) {
            return false;
        }
        match (
            self.segment.direction().try_normalize(f64::MIN_POSITIVE),
            other.segment.direction().try_normalize(f64::MIN_POSITIVE),
        ) {
            (Some(dir1), Some(dir2)) => {
                vectors_equal(&dir1, &dir2, epsilon) || vectors_equal(&dir1, &-dir2, epsilon)
            }
            _ => true,
        }
    }

    /// Line crosses an edge of `triangle`, or its center lies strictly inside it
    pub fn check_collision(&self, triangle: &Triangle3, epsilon: f64) -> bool {
        triangle
            .edges()
            .iter()
            .any(|edge| check_line_line_intersection(&self.segment, edge, epsilon))
            || check_point_inside(triangle, &self.segment.center(), epsilon)
    }
}

/// Kinds of segment contact tested by [`check_line_line_contact`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact(u8);

impl Contact {
    /// Any endpoint of one coincides with an endpoint of the other
    pub const CORNERS: Contact = Contact(0b001);
    /// Both endpoints coincide
    pub const EDGES: Contact = Contact(0b010);
    /// Proper crossing away from the endpoints
    pub const CUT: Contact = Contact(0b100);

    pub fn contains(self, other: Contact) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Contact {
    type Output = Contact;

    fn bitor(self, rhs: Contact) -> Contact {
        Contact(self.0 | rhs.0)
    }
}

/// Segments cross at a point that is not near any of their endpoints.
///
/// The segments meet when the squared distance between their closest points
/// is at most `epsilon`.
pub fn check_line_line_intersection(a: &Segment3, b: &Segment3, epsilon: f64) -> bool {
    if check_line_line_contact(a, b, Contact::CORNERS, epsilon) {
        return false;
    }

    let (p1, p2) = a.closest_points(b);
    if (p1 - p2).norm_squared() > epsilon {
        return false;
    }

    let away = |p: &Point3<f64>| {
        [a.start, a.end, b.start, b.end]
            .iter()
            .all(|end| (p - end).norm() > epsilon)
    };
    away(&p1) && away(&p2)
}

/// Point where the segments meet, endpoints included; same squared
/// tolerance as [`check_line_line_intersection`]
pub fn line_line_intersection(a: &Segment3, b: &Segment3, epsilon: f64) -> Option<Point3<f64>> {
    let (p1, p2) = a.closest_points(b);
    if (p1 - p2).norm_squared() <= epsilon {
        Some(p1)
    } else {
        None
    }
}

pub fn check_line_line_contact(a: &Segment3, b: &Segment3, flags: Contact, epsilon: f64) -> bool {
    let start_start = points_equal(&a.start, &b.start, epsilon);
    let end_end = points_equal(&a.end, &b.end, epsilon);
    let start_end = points_equal(&a.start, &b.end, epsilon);
    let end_start = points_equal(&a.end, &b.start, epsilon);

    if flags.contains(Contact::CORNERS) && (start_start || end_end || start_end || end_start) {
        return true;
    }

    if flags.contains(Contact::EDGES) && ((start_start && end_end) || (start_end && end_start)) {
        return true;
    }

    flags.contains(Contact::CUT) && check_line_line_intersection(a, b, epsilon)
}
