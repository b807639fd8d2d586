// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Coplanar face groups: cut line bookkeeping and retriangulation checks

use super::context::CutContext;
use super::line::CutLine;
use super::report::RejectionStats;
use super::strategy::Retriangulator;
use super::triangle::{
    check_collision, check_line_edges_contact, check_normal_equality, check_point_inside_inv,
    line_edges_intersection, FaceId, FinalTriangle, Triangle,
};
use super::vertex::{Vertex, VertexId, VertexPool};
use crate::geometry::{Plane, Segment3, Triangle3};
use crate::utils::math::{cmp_points, points_equal};
use ahash::AHashMap;
use nalgebra::Point3;
use tracing::trace;

/// Why a candidate triangle was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Area not above epsilon
    Degenerate,
    /// Winding disagrees with the face normal
    Normal,
    /// Overlaps an accepted triangle or crosses a cut line
    Collision,
    /// Center lies on the discarded side of the closest cut line
    CutSide,
    /// Equidistant cut lines disagree on the side of the center
    Ambiguous,
    /// Center lies on an opposing coplanar triangle this side drops
    Coplanar,
    /// Reaches outside the original face
    Concave,
}

/// Result of looking up the cut line that decides a candidate's side
#[derive(Debug, Clone, Copy)]
pub enum ClosestCutLine<'a> {
    Line(&'a CutLine),
    Ambiguous,
    None,
}

/// Opposing triangle lying in the plane of a face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoplanarContact {
    /// Index of the triangle in the opposing model
    pub triangle: usize,
    pub coords: Triangle3,
    /// Both normals point the same way
    pub same_orientation: bool,
}

/// Maximal group of coplanar source triangles
#[derive(Debug, Clone)]
pub struct Face {
    pub id: FaceId,
    /// Surface the retriangulated output is written to
    pub surface: usize,
    pub plane: Plane,
    pub triangles: Vec<Triangle>,
    pub cut_lines: Vec<CutLine>,
    pub coplanar: Vec<CoplanarContact>,
    pub cut_vertices: Vec<VertexId>,
    pub orig_vertices: Vec<VertexId>,
    pub vertices: Vec<VertexId>,
    pub final_triangles: Vec<FinalTriangle>,
    sources: AHashMap<(usize, u32), VertexId>,
}

impl Face {
    pub fn new(id: FaceId, surface: usize, plane: Plane) -> Self {
        Self {
            id,
            surface,
            plane,
            triangles: Vec::new(),
            cut_lines: Vec::new(),
            coplanar: Vec::new(),
            cut_vertices: Vec::new(),
            orig_vertices: Vec::new(),
            vertices: Vec::new(),
            final_triangles: Vec::new(),
            sources: AHashMap::new(),
        }
    }

    /// Add the cut `segment` found on the source triangle `a b c`, expressing
    /// its endpoints as interpolations of the triangle's corners
    pub fn add_cut_line(
        &mut self,
        pool: &mut VertexPool,
        corners: [&Vertex; 3],
        segment: &Segment3,
        opposite_plane: Plane,
    ) {
        let [a, b, c] = corners;
        let start = pool.push(Vertex::interpolate(segment.start, a, b, c));
        let end = pool.push(Vertex::interpolate(segment.end, a, b, c));
        self.cut_lines
            .push(CutLine::new(start, end, pool, opposite_plane, self.id));
    }

    /// Record opposing triangle `triangle` if it lies in this face's plane,
    /// facing either way. Returns false when it does not.
    pub fn add_coplanar_contact(
        &mut self,
        triangle: usize,
        coords: &Triangle3,
        plane: &Plane,
        epsilon: f64,
    ) -> bool {
        let same_orientation = self.plane.approx_eq(plane, epsilon);
        if !same_orientation && !self.plane.approx_eq(&plane.flipped(), epsilon) {
            return false;
        }
        if !self.coplanar.iter().any(|c| c.triangle == triangle) {
            self.coplanar.push(CoplanarContact {
                triangle,
                coords: *coords,
                same_orientation,
            });
        }
        true
    }

    /// Merge collinear lines that share an opposing plane into covering segments
    pub fn optimize_cut_lines(&mut self, pool: &VertexPool, epsilon: f64) {
        if self.cut_lines.is_empty() {
            return;
        }

        self.cut_lines.sort_by(|a, b| a.plane.total_cmp(&b.plane));

        let mut merged: Vec<CutLine> = Vec::with_capacity(self.cut_lines.len());
        for line in self.cut_lines.drain(..) {
            let Some(last) = merged.last_mut() else {
                merged.push(line);
                continue;
            };
            if !last.check_redundance(&line, epsilon) {
                merged.push(line);
                continue;
            }
            if !last.segment.is_between(&line.segment.center()) {
                let ends = [last.a, last.b, line.a, line.b];
                let mut best = (0, 1, -1.0);
                for i in 0..ends.len() {
                    for j in (i + 1)..ends.len() {
                        let dist = (pool.position(ends[i]) - pool.position(ends[j])).norm_squared();
                        if dist > best.2 {
                            best = (i, j, dist);
                        }
                    }
                }
                last.set_endpoints(ends[best.0], ends[best.1], pool);
            }
        }
        self.cut_lines = merged;
    }

    /// Collect the endpoints of every cut line, then drop duplicates
    pub fn create_cut_vertices(&mut self, pool: &VertexPool, epsilon: f64) {
        self.cut_vertices = self
            .cut_lines
            .iter()
            .flat_map(|line| [line.a, line.b])
            .collect();
        self.optimize_cut_vertices(pool, epsilon);
    }

    /// Sort cut vertices by position and keep one per location
    pub fn optimize_cut_vertices(&mut self, pool: &VertexPool, epsilon: f64) {
        self.cut_vertices
            .sort_by(|a, b| cmp_points(&pool.position(*a), &pool.position(*b)));

        let mut unique: Vec<VertexId> = Vec::with_capacity(self.cut_vertices.len());
        for &id in &self.cut_vertices {
            let position = pool.position(id);
            if !unique
                .iter()
                .any(|kept| points_equal(&pool.position(*kept), &position, epsilon))
            {
                unique.push(id);
            }
        }
        self.cut_vertices = unique;
    }

    /// Record a retained source vertex; returns false if it was already known
    pub fn add_orig_vertex(&mut self, pool: &mut VertexPool, vertex: Vertex) -> bool {
        let Some(index) = vertex.index else {
            return false;
        };
        let key = (vertex.surface, index);
        if self.sources.contains_key(&key) {
            return false;
        }
        let id = pool.push(vertex);
        self.sources.insert(key, id);
        self.orig_vertices.push(id);
        true
    }

    /// Working vertex created from source vertex `index` of `surface`
    pub fn vertex_by_source(&self, surface: usize, index: u32) -> Option<VertexId> {
        self.sources.get(&(surface, index)).copied()
    }

    /// Whether a cut line or an opposing coplanar triangle touches this face
    pub fn is_touched(&self) -> bool {
        !self.cut_lines.is_empty() || !self.coplanar.is_empty()
    }

    /// Fill `final_triangles`: original triangles when untouched, otherwise a
    /// fresh triangulation of `vertices`
    pub fn generate_delta_connections(
        &mut self,
        pool: &VertexPool,
        retriangulator: &dyn Retriangulator,
        ctx: &CutContext,
        stats: &mut RejectionStats,
    ) {
        if !self.is_touched() {
            self.create_default_face(pool);
            return;
        }
        self.final_triangles = retriangulator.retriangulate(self, pool, ctx, stats);
    }

    /// Accept `candidate` only if it passes every check against the face and
    /// the triangles accepted so far
    pub fn check_delta_connection(
        &self,
        candidate: &Triangle3,
        accepted: &[FinalTriangle],
        ctx: &CutContext,
    ) -> Result<(), Rejection> {
        if !check_normal_equality(candidate, &self.plane.normal, ctx.epsilon) {
            return Err(Rejection::Normal);
        }
        if self.check_triangle_collision(candidate, accepted, ctx.epsilon) {
            return Err(Rejection::Collision);
        }
        match self.coplanar_side(&candidate.center(), ctx) {
            Some(true) => {}
            Some(false) => return Err(Rejection::Coplanar),
            None => self.check_cut_planes_side(candidate, ctx)?,
        }
        if !self.check_inside_concave_face(candidate, ctx.epsilon) {
            return Err(Rejection::Concave);
        }
        Ok(())
    }

    pub fn check_triangle_collision(
        &self,
        candidate: &Triangle3,
        accepted: &[FinalTriangle],
        epsilon: f64,
    ) -> bool {
        accepted
            .iter()
            .any(|tri| check_collision(&tri.coords, candidate, epsilon))
            || self
                .cut_lines
                .iter()
                .any(|line| line.check_collision(candidate, epsilon))
    }

    /// Whether `point` is kept, if it lies on an opposing coplanar triangle.
    /// Such a point sits on both surfaces, so no cut plane can tell its side.
    pub fn coplanar_side(&self, point: &Point3<f64>, ctx: &CutContext) -> Option<bool> {
        self.coplanar
            .iter()
            .find(|contact| check_point_inside_inv(&contact.coords, point, ctx.epsilon))
            .map(|contact| ctx.keeps_coplanar(contact.same_orientation))
    }

    /// Reject a candidate whose center lies on the discarded side of its closest cut line
    pub fn check_cut_planes_side(
        &self,
        candidate: &Triangle3,
        ctx: &CutContext,
    ) -> Result<(), Rejection> {
        let center = candidate.center();
        match self.closest_cut_line(candidate, &center, ctx) {
            ClosestCutLine::Line(line) => {
                if ctx.is_discarded_side(line.plane.signed_distance(&center)) {
                    Err(Rejection::CutSide)
                } else {
                    Ok(())
                }
            }
            ClosestCutLine::Ambiguous => Err(Rejection::Ambiguous),
            ClosestCutLine::None => Ok(()),
        }
    }

    /// A line lying on one of the candidate's edges wins outright. Otherwise the
    /// line nearest to `point`, unless an equally near line disagrees on which
    /// side of its plane `point` lies.
    pub fn closest_cut_line(
        &self,
        candidate: &Triangle3,
        point: &Point3<f64>,
        ctx: &CutContext,
    ) -> ClosestCutLine<'_> {
        if let Some(line) = self
            .cut_lines
            .iter()
            .find(|line| check_line_edges_contact(candidate, &line.segment, ctx.epsilon))
        {
            return ClosestCutLine::Line(line);
        }

        let distances: Vec<f64> = self
            .cut_lines
            .iter()
            .map(|line| line.segment.point_distance(point))
            .collect();

        let Some((closest_idx, &closest_dist)) = distances
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            return ClosestCutLine::None;
        };

        let closest = &self.cut_lines[closest_idx];
        let verdict = ctx.is_discarded_side(closest.plane.signed_distance(point));

        let disagreement = self.cut_lines.iter().zip(&distances).enumerate().any(
            |(idx, (line, &dist))| {
                idx != closest_idx
                    && dist <= closest_dist + ctx.epsilon
                    && ctx.is_discarded_side(line.plane.signed_distance(point)) != verdict
            },
        );

        if disagreement {
            ClosestCutLine::Ambiguous
        } else {
            ClosestCutLine::Line(closest)
        }
    }

    /// Every sub-triangle spanned by the candidate's cut points must have its
    /// center on the original face
    pub fn check_inside_concave_face(&self, candidate: &Triangle3, epsilon: f64) -> bool {
        let points = self.fill_cut_point_list(candidate, epsilon);

        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                for k in (j + 1)..points.len() {
                    let sub = Triangle3::new(points[i], points[j], points[k]);
                    if sub.area() <= epsilon {
                        continue;
                    }
                    if !self.is_point_inside(&sub.center(), epsilon) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Candidate corners, original corners inside the candidate, and every
    /// crossing of a candidate edge with an original edge
    pub fn fill_cut_point_list(&self, candidate: &Triangle3, epsilon: f64) -> Vec<Point3<f64>> {
        let mut points: Vec<Point3<f64>> = candidate.points().to_vec();
        let edges = candidate.edges();

        for tri in &self.triangles {
            points.extend(
                tri.coords
                    .points()
                    .iter()
                    .filter(|p| candidate.contains_point(p)),
            );
            for edge in &edges {
                line_edges_intersection(&tri.coords, edge, epsilon, &mut points);
            }
        }

        let mut unique: Vec<Point3<f64>> = Vec::with_capacity(points.len());
        for point in points {
            if !unique.iter().any(|p| points_equal(p, &point, epsilon)) {
                unique.push(point);
            }
        }
        unique
    }

    /// Point lies on one of the original triangles (boundary included)
    pub fn is_point_inside(&self, point: &Point3<f64>, epsilon: f64) -> bool {
        self.triangles
            .iter()
            .any(|tri| check_point_inside_inv(&tri.coords, point, epsilon))
    }

    /// Re-emit the original triangles whose three corners were all retained
    pub fn create_default_face(&mut self, pool: &VertexPool) {
        let mut final_triangles = Vec::with_capacity(self.triangles.len());
        for tri in &self.triangles {
            let ids = tri
                .indices
                .map(|index| self.vertex_by_source(tri.surface, index));
            if let [Some(a), Some(b), Some(c)] = ids {
                final_triangles.push(FinalTriangle {
                    vertices: [a, b, c],
                    coords: Triangle3::new(pool.position(a), pool.position(b), pool.position(c)),
                });
            } else {
                trace!(face = self.id.0, "original triangle dropped with its vertices");
            }
        }
        self.final_triangles = final_triangles;
    }
}
