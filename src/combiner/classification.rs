// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Point classification against a closed triangle surface

use super::triangle::Triangle;
use nalgebra::Point3;

/// Position of a point relative to a closed surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Inside,
    Outside,
    /// Within epsilon of the surface
    OnBoundary,
}

impl Classification {
    /// Whether a vertex with this classification survives when the model
    /// keeps its front (outside) or back (inside) part
    pub fn is_retained(self, keep_front: bool) -> bool {
        if keep_front {
            self != Classification::Inside
        } else {
            self != Classification::Outside
        }
    }
}

/// Classify `point` by the planes of its nearest triangles.
///
/// Among the triangles within `epsilon` of the minimum distance, the one
/// whose plane lies farthest from the point decides. Near an edge or corner
/// that plane is the one facing the point, so neighbouring planes that merely
/// pass through it do not turn an outside point into a boundary one.
/// An empty surface encloses nothing.
pub fn classify_point<'a>(
    point: &Point3<f64>,
    triangles: impl IntoIterator<Item = &'a Triangle>,
    epsilon: f64,
) -> Classification {
    let distances: Vec<(f64, &Triangle)> = triangles
        .into_iter()
        .map(|tri| ((tri.coords.closest_point(point) - point).norm(), tri))
        .collect();

    let Some(min) = distances.iter().map(|(d, _)| *d).min_by(f64::total_cmp) else {
        return Classification::Outside;
    };

    let signed = distances
        .iter()
        .filter(|(d, _)| *d <= min + epsilon)
        .map(|(_, tri)| tri.plane.signed_distance(point))
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);

    if signed < -epsilon {
        Classification::Inside
    } else if signed > epsilon {
        Classification::Outside
    } else {
        Classification::OnBoundary
    }
}
