// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Working copy of one host mesh: world-space snapshot, faces and cut state

use super::classification::{classify_point, Classification};
use super::context::{BuildContext, CutContext};
use super::face::Face;
use super::host::{BooleanMesh, MeshBufferAccess};
use super::report::{ModelReport, RejectionStats};
use super::strategy::{IntersectionStrategy, Retriangulator};
use super::triangle::{FaceId, Triangle};
use super::vertex::{Vertex, VertexPool};
use crate::error::CombineError;
use crate::geometry::triangle_intersection::intersection_segment;
use crate::geometry::{BoundingBox, Triangle3, BVH, MAX_TEX_LAYERS};
use nalgebra::{Matrix3, Point3, UnitQuaternion, Vector3};
use tracing::{debug, trace, warn};

/// Snapshot of a host mesh in world space plus everything the cut produces
#[derive(Debug, Clone)]
pub struct Model {
    surfaces: Vec<Vec<Vertex>>,
    triangles: Vec<Triangle>,
    bvh: BVH,
    bounds: BoundingBox,
    translation: Vector3<f64>,
    faces: Vec<Face>,
    pool: VertexPool,
    rejections: RejectionStats,
}

impl Model {
    /// Read every surface of `mesh`, transforming vertices into world space.
    ///
    /// Fails if any triangle references a vertex its surface does not have;
    /// nothing is read from the mesh past that point.
    pub fn new<M: BooleanMesh>(mesh: &M) -> Result<Self, CombineError> {
        let matrix = mesh.transform_matrix();
        let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear)
            .to_homogeneous();

        let mut surfaces = Vec::with_capacity(mesh.buffer_count());
        let mut triangles = Vec::new();

        for surface in 0..mesh.buffer_count() {
            let buffer = mesh.buffer(surface);
            validate_indices(buffer, surface)?;

            let vertices: Vec<Vertex> = (0..buffer.vertex_count() as u32)
                .map(|index| Vertex::from_source(buffer, surface, index, &matrix, &normal_matrix))
                .collect();

            for t in 0..buffer.triangle_count() {
                let indices = buffer.triangle_indices(t);
                let [a, b, c] = indices.map(|i| vertices[i as usize].position);
                triangles.push(Triangle::new(surface, indices, Triangle3::new(a, b, c)));
            }
            surfaces.push(vertices);
        }

        let bvh = BVH::build(
            triangles
                .iter()
                .enumerate()
                .map(|(i, tri)| (i, tri.coords.bounds()))
                .collect(),
        );
        let bounds = triangles
            .iter()
            .fold(BoundingBox::empty(), |acc, tri| acc.union(&tri.coords.bounds()));

        Ok(Self {
            surfaces,
            triangles,
            bvh,
            bounds,
            translation: mesh.translation(),
            faces: Vec::new(),
            pool: VertexPool::new(),
            rejections: RejectionStats::default(),
        })
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn pool(&self) -> &VertexPool {
        &self.pool
    }

    pub fn bvh(&self) -> &BVH {
        &self.bvh
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Group triangles into faces of equal plane within `epsilon`.
    ///
    /// Triangles are visited in plane order; each joins the face of the
    /// previous triangle when their planes match, else any earlier face with a
    /// matching plane, else starts a new face. A face takes the plane of its
    /// first triangle. Faces never span surfaces.
    pub fn create_faces(&mut self, epsilon: f64) {
        let mut order: Vec<usize> = (0..self.triangles.len()).collect();
        order.sort_by(|&a, &b| {
            let (ta, tb) = (&self.triangles[a], &self.triangles[b]);
            ta.surface
                .cmp(&tb.surface)
                .then_with(|| ta.plane.total_cmp(&tb.plane))
        });

        let mut faces: Vec<Face> = Vec::new();
        for idx in order {
            let tri = &self.triangles[idx];
            let joins = |face: &Face| {
                face.surface == tri.surface && face.plane.approx_eq(&tri.plane, epsilon)
            };

            let target = match faces.last() {
                Some(last) if joins(last) => Some(faces.len() - 1),
                _ => faces.iter().position(|face| joins(face)),
            };

            let face_idx = target.unwrap_or_else(|| {
                faces.push(Face::new(FaceId(faces.len()), tri.surface, tri.plane));
                faces.len() - 1
            });

            self.triangles[idx].face = FaceId(face_idx);
            faces[face_idx].triangles.push(self.triangles[idx].clone());
        }

        debug!(
            triangles = self.triangles.len(),
            faces = faces.len(),
            "grouped coplanar triangles"
        );
        self.faces = faces;
    }

    /// Record the segments where this model's triangles cross `opposite`,
    /// then merge them per face and derive the cut vertices. Overlapping
    /// opposing triangles in a face's own plane are kept as coplanar contacts.
    pub fn compute_cut_lines(
        &mut self,
        opposite: &Model,
        ctx: &CutContext,
        strategy: &dyn IntersectionStrategy,
    ) {
        let mut tested = 0usize;
        for tri in &self.triangles {
            let bounds = tri.coords.bounds().inflated(ctx.epsilon);
            for candidate in strategy.candidates(&bounds, opposite) {
                tested += 1;
                let other = &opposite.triangles[candidate];
                if bounds.intersects(&other.coords.bounds())
                    && self.faces[tri.face.0].add_coplanar_contact(
                        candidate,
                        &other.coords,
                        &other.plane,
                        ctx.epsilon,
                    )
                {
                    continue;
                }
                let Some(segment) = intersection_segment(&tri.coords, &other.coords, ctx.epsilon)
                else {
                    continue;
                };
                if segment.length() <= ctx.epsilon {
                    continue;
                }

                let vertices = &self.surfaces[tri.surface];
                let corners = tri.indices.map(|i| &vertices[i as usize]);
                self.faces[tri.face.0].add_cut_line(&mut self.pool, corners, &segment, other.plane);
            }
        }

        for face in &mut self.faces {
            let raw = face.cut_lines.len();
            face.optimize_cut_lines(&self.pool, ctx.epsilon);
            face.create_cut_vertices(&self.pool, ctx.epsilon);
            if raw > 0 {
                trace!(
                    face = face.id.0,
                    raw,
                    merged = face.cut_lines.len(),
                    cut_vertices = face.cut_vertices.len(),
                    "cut lines merged"
                );
            }
        }

        debug!(
            strategy = strategy.name(),
            tested,
            cut_lines = self.faces.iter().map(|f| f.cut_lines.len()).sum::<usize>(),
            coplanar = self.faces.iter().map(|f| f.coplanar.len()).sum::<usize>(),
            "computed cut lines"
        );
    }

    /// Classify `point` against this model's surface
    pub fn classify(&self, point: &Point3<f64>, epsilon: f64) -> Classification {
        classify_point(point, &self.triangles, epsilon)
    }

    /// Whether `point` lies in the region this model retains with respect to
    /// `opposite`: not inside it when keeping the front, not outside it when
    /// keeping the back
    pub fn is_point_inside(&self, opposite: &Model, point: &Point3<f64>, ctx: &CutContext) -> bool {
        opposite
            .classify(point, ctx.epsilon)
            .is_retained(ctx.keep_front)
    }

    /// Keep the source vertices lying on the retained side of `opposite`, then
    /// assemble each face's vertex set from its cut and retained vertices
    pub fn create_vertices(&mut self, opposite: &Model, ctx: &CutContext) {
        let mut cache: Vec<Vec<Option<Classification>>> = self
            .surfaces
            .iter()
            .map(|vertices| vec![None; vertices.len()])
            .collect();

        let mut retained = 0usize;
        for face in &mut self.faces {
            let sources: Vec<(usize, u32)> = face
                .triangles
                .iter()
                .flat_map(|tri| tri.indices.map(|i| (tri.surface, i)))
                .collect();

            for (surface, index) in sources {
                let vertex = self.surfaces[surface][index as usize];
                let class = *cache[surface][index as usize]
                    .get_or_insert_with(|| opposite.classify(&vertex.position, ctx.epsilon));
                if class.is_retained(ctx.keep_front)
                    && face.add_orig_vertex(&mut self.pool, vertex)
                {
                    retained += 1;
                }
            }

            face.vertices = face
                .cut_vertices
                .iter()
                .chain(face.orig_vertices.iter())
                .copied()
                .collect();
        }

        debug!(retained, keep_front = ctx.keep_front, "classified source vertices");
    }

    /// Rebuild the triangles of every face
    pub fn generate_delta_connections(
        &mut self,
        retriangulator: &dyn Retriangulator,
        ctx: &CutContext,
    ) {
        let mut stats = RejectionStats::default();
        for face in &mut self.faces {
            face.generate_delta_connections(&self.pool, retriangulator, ctx, &mut stats);
            if face.is_touched() && face.final_triangles.is_empty() && !face.vertices.is_empty() {
                warn!(
                    face = face.id.0,
                    vertices = face.vertices.len(),
                    cut_lines = face.cut_lines.len(),
                    "cut face produced no triangles"
                );
            }
        }
        debug!(
            retriangulator = retriangulator.name(),
            triangles = self.faces.iter().map(|f| f.final_triangles.len()).sum::<usize>(),
            rejected = stats.total(),
            "retriangulated faces"
        );
        self.rejections.merge(&stats);
    }

    pub fn report(&self) -> ModelReport {
        let mut report = ModelReport {
            faces: self.faces.len(),
            rejections: self.rejections,
            ..ModelReport::default()
        };
        for face in &self.faces {
            if face.is_touched() {
                if face.final_triangles.is_empty() {
                    report.degenerate_faces += 1;
                }
            } else {
                report.untouched_faces += 1;
            }
            report.cut_lines += face.cut_lines.len();
            report.cut_vertices += face.cut_vertices.len();
            report.orig_vertices += face.orig_vertices.len();
            report.final_triangles += face.final_triangles.len();
        }
        report
    }

    /// Replace the triangles of `mesh` with the retriangulated faces.
    ///
    /// Vertices are written relative to the mesh's translation and the mesh's
    /// rotation and scale are reset, so positions stay put in world space.
    pub fn build<M: BooleanMesh>(&mut self, mesh: &mut M, ctx: BuildContext) {
        for surface in 0..mesh.buffer_count() {
            mesh.buffer_mut(surface).clear_indices();
        }

        let mut emitted: Vec<Option<u32>> = vec![None; self.pool.len()];
        let mut triangles = 0usize;
        for face in &self.faces {
            let buffer = mesh.buffer_mut(face.surface);
            for tri in &face.final_triangles {
                let [a, b, c] = tri.vertices;
                let ids = if ctx.flip { [a, c, b] } else { [a, b, c] };

                let [i0, i1, i2] = ids.map(|id| {
                    *emitted[id.0].get_or_insert_with(|| {
                        let v = &self.pool[id];
                        let normal = if ctx.flip { -v.normal } else { v.normal };
                        let index = buffer.add_vertex(
                            v.position - self.translation,
                            normal,
                            v.tex_coords[0],
                            v.color_bytes(),
                            v.fog,
                        );
                        for layer in 1..MAX_TEX_LAYERS {
                            buffer.set_vertex_tex_coord(index, v.tex_coords[layer], layer);
                        }
                        index
                    })
                });
                buffer.add_triangle(i0, i1, i2);
                triangles += 1;
            }
        }

        mesh.update_mesh_buffer();
        mesh.set_rotation(UnitQuaternion::identity());
        mesh.set_scale(Vector3::repeat(1.0));

        debug!(triangles, flip = ctx.flip, "rebuilt mesh buffers");
        self.clear();
    }

    /// Drop every face and working vertex
    pub fn clear(&mut self) {
        self.faces.clear();
        self.pool = VertexPool::new();
        self.rejections = RejectionStats::default();
        for tri in &mut self.triangles {
            tri.face = FaceId(0);
        }
    }
}

fn validate_indices<B: MeshBufferAccess>(buffer: &B, surface: usize) -> Result<(), CombineError> {
    let vertex_count = buffer.vertex_count();
    for triangle in 0..buffer.triangle_count() {
        if let Some(&index) = buffer
            .triangle_indices(triangle)
            .iter()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(CombineError::IndexOutOfRange {
                surface,
                triangle,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}
