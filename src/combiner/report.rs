// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Diagnostics collected while combining two models

use super::face::Rejection;
use serde::{Deserialize, Serialize};

/// Candidate triangles turned down during retriangulation, by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionStats {
    pub degenerate: usize,
    pub normal: usize,
    pub collision: usize,
    pub cut_side: usize,
    pub ambiguous: usize,
    pub coplanar: usize,
    pub concave: usize,
}

impl RejectionStats {
    pub fn record(&mut self, reason: Rejection) {
        match reason {
            Rejection::Degenerate => self.degenerate += 1,
            Rejection::Normal => self.normal += 1,
            Rejection::Collision => self.collision += 1,
            Rejection::CutSide => self.cut_side += 1,
            Rejection::Ambiguous => self.ambiguous += 1,
            Rejection::Coplanar => self.coplanar += 1,
            Rejection::Concave => self.concave += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.degenerate
            + self.normal
            + self.collision
            + self.cut_side
            + self.ambiguous
            + self.coplanar
            + self.concave
    }

    pub fn merge(&mut self, other: &RejectionStats) {
        self.degenerate += other.degenerate;
        self.normal += other.normal;
        self.collision += other.collision;
        self.cut_side += other.cut_side;
        self.ambiguous += other.ambiguous;
        self.coplanar += other.coplanar;
        self.concave += other.concave;
    }
}

/// Per-model counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReport {
    pub faces: usize,
    /// Faces touching neither a cut line nor an opposing coplanar
    /// triangle, emitted from their original triangles
    pub untouched_faces: usize,
    pub cut_lines: usize,
    pub cut_vertices: usize,
    pub orig_vertices: usize,
    pub final_triangles: usize,
    /// Touched faces whose retriangulation produced nothing
    pub degenerate_faces: usize,
    pub rejections: RejectionStats,
}

/// Summary of one `combine_models` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineReport {
    pub method: crate::geometry::BooleanOp,
    pub intersection_strategy: String,
    pub retriangulator: String,
    pub model_a: ModelReport,
    pub model_b: ModelReport,
}

impl CombineReport {
    pub fn total_triangles(&self) -> usize {
        self.model_a.final_triangles + self.model_b.final_triangles
    }
}
