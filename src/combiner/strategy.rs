// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pluggable stages of the combiner: candidate search and face retriangulation

use super::context::CutContext;
use super::face::{Face, Rejection};
use super::model::Model;
use super::report::RejectionStats;
use super::triangle::FinalTriangle;
use super::vertex::VertexPool;
use crate::geometry::{BoundingBox, Triangle3};
use crate::utils::math::points_equal;
use tracing::trace;

/// Picks the opposing triangles worth intersecting with a source triangle
pub trait IntersectionStrategy: Send + Sync {
    /// Indices into `opposite.triangles()`, ascending
    fn candidates(&self, bounds: &BoundingBox, opposite: &Model) -> Vec<usize>;

    fn name(&self) -> &'static str;
}

/// Every opposing triangle is a candidate
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce;

impl IntersectionStrategy for BruteForce {
    fn candidates(&self, _bounds: &BoundingBox, opposite: &Model) -> Vec<usize> {
        (0..opposite.triangles().len()).collect()
    }

    fn name(&self) -> &'static str {
        "brute-force"
    }
}

/// Opposing triangles whose bounds overlap, found through the opposite model's BVH
#[derive(Debug, Clone, Copy, Default)]
pub struct BvhCulled;

impl IntersectionStrategy for BvhCulled {
    fn candidates(&self, bounds: &BoundingBox, opposite: &Model) -> Vec<usize> {
        opposite.bvh().query_triangles(bounds)
    }

    fn name(&self) -> &'static str {
        "bvh"
    }
}

/// Rebuilds the triangles of a cut face from its vertex set
pub trait Retriangulator: Send + Sync {
    fn retriangulate(
        &self,
        face: &Face,
        pool: &VertexPool,
        ctx: &CutContext,
        stats: &mut RejectionStats,
    ) -> Vec<FinalTriangle>;

    fn name(&self) -> &'static str;
}

/// Greedy triangulation: every vertex triple is tried in a fixed order and
/// kept when it passes the face's checks against what was kept so far.
///
/// Triples are enumerated as `i < j`, `i < k`, `j != k`, so each unordered
/// triple is offered in both windings exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaConnector;

impl Retriangulator for DeltaConnector {
    fn retriangulate(
        &self,
        face: &Face,
        pool: &VertexPool,
        ctx: &CutContext,
        stats: &mut RejectionStats,
    ) -> Vec<FinalTriangle> {
        let vertices = &face.vertices;
        let coincident = |a: usize, b: usize| {
            points_equal(
                &pool.position(vertices[a]),
                &pool.position(vertices[b]),
                ctx.epsilon,
            )
        };

        let mut accepted: Vec<FinalTriangle> = Vec::new();
        for i in 0..vertices.len() {
            for j in (i + 1)..vertices.len() {
                if coincident(i, j) {
                    continue;
                }
                for k in (i + 1)..vertices.len() {
                    if k == j || coincident(i, k) || coincident(j, k) {
                        continue;
                    }

                    let ids = [vertices[i], vertices[j], vertices[k]];
                    let coords = Triangle3::new(
                        pool.position(ids[0]),
                        pool.position(ids[1]),
                        pool.position(ids[2]),
                    );

                    let verdict = if coords.area() <= ctx.epsilon {
                        Err(Rejection::Degenerate)
                    } else {
                        face.check_delta_connection(&coords, &accepted, ctx)
                    };

                    match verdict {
                        Ok(()) => accepted.push(FinalTriangle {
                            vertices: ids,
                            coords,
                        }),
                        Err(reason) => {
                            trace!(face = face.id.0, ?ids, ?reason, "candidate rejected");
                            stats.record(reason);
                        }
                    }
                }
            }
        }
        accepted
    }

    fn name(&self) -> &'static str {
        "delta-connector"
    }
}
