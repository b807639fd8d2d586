// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh boolean combiner.
//!
//! Each operand is snapshotted into a [`Model`], its coplanar triangles are
//! grouped into faces, and every face is cut along the segments where it
//! crosses the other operand. Source vertices are classified against the
//! other operand; faces with cut lines are retriangulated from their cut and
//! retained vertices, untouched faces keep their triangles. Finally each
//! model is written back into its host mesh.

mod classification;
mod context;
mod face;
mod host;
mod line;
mod model;
mod operator;
mod report;
mod strategy;
mod triangle;
mod vertex;

pub use classification::{classify_point, Classification};
pub use context::{default_precision, set_default_precision, BuildContext, CutContext, DEFAULT_PRECISION};
pub use face::{ClosestCutLine, CoplanarContact, Face, Rejection};
pub use host::{BooleanMesh, MeshBufferAccess};
pub use line::{
    check_line_line_contact, check_line_line_intersection, line_line_intersection, Contact,
    CutLine,
};
pub use model::Model;
pub use operator::MeshBooleanOperator;
pub use report::{CombineReport, ModelReport, RejectionStats};
pub use strategy::{BruteForce, BvhCulled, DeltaConnector, IntersectionStrategy, Retriangulator};
pub use triangle::{FaceId, FinalTriangle, Triangle};
pub use vertex::{Vertex, VertexId, VertexPool};
