// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) for spatial acceleration
//! Used to cull opposing triangles before triangle-triangle intersection tests

use super::BoundingBox;

/// BVH node
#[derive(Debug, Clone)]
pub struct BVHNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BVHNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BVHNode>>,
    /// Triangle indices (only for leaf nodes)
    pub triangle_indices: Vec<usize>,
}

impl BVHNode {
    fn leaf(bbox: BoundingBox, triangle_indices: Vec<usize>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            triangle_indices,
        }
    }

    fn internal(bbox: BoundingBox, left: Box<BVHNode>, right: Box<BVHNode>) -> Self {
        Self {
            bbox,
            left: Some(left),
            right: Some(right),
            triangle_indices: Vec::new(),
        }
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Bounding Volume Hierarchy over triangle bounds
#[derive(Debug, Clone)]
pub struct BVH {
    root: BVHNode,
}

impl BVH {
    /// Build BVH from `(triangle_index, bbox)` pairs
    pub fn build(triangles: Vec<(usize, BoundingBox)>) -> Self {
        if triangles.is_empty() {
            return Self {
                root: BVHNode::leaf(BoundingBox::empty(), Vec::new()),
            };
        }

        let root = Self::build_recursive(triangles, 0);
        Self { root }
    }

    fn build_recursive(mut triangles: Vec<(usize, BoundingBox)>, depth: usize) -> BVHNode {
        const MAX_DEPTH: usize = 32;
        const MIN_TRIANGLES: usize = 4;

        let bbox = Self::compute_union_bbox(&triangles);

        if triangles.len() <= MIN_TRIANGLES || depth >= MAX_DEPTH {
            let indices: Vec<usize> = triangles.iter().map(|(idx, _)| *idx).collect();
            return BVHNode::leaf(bbox, indices);
        }

        // Median split on the longest axis
        let split_axis = bbox.size().imax();
        triangles.sort_by(|(_, bbox_a), (_, bbox_b)| {
            bbox_a.center()[split_axis].total_cmp(&bbox_b.center()[split_axis])
        });

        let right_triangles = triangles.split_off(triangles.len() / 2);

        let left = Box::new(Self::build_recursive(triangles, depth + 1));
        let right = Box::new(Self::build_recursive(right_triangles, depth + 1));

        BVHNode::internal(bbox, left, right)
    }

    fn compute_union_bbox(triangles: &[(usize, BoundingBox)]) -> BoundingBox {
        triangles
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, tri_bbox)| acc.union(tri_bbox))
    }

    /// Query triangles whose bounds intersect the given box, in ascending index order
    pub fn query_triangles(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut result = Vec::new();
        Self::query_recursive(&self.root, bbox, &mut result);
        result.sort_unstable();
        result
    }

    fn query_recursive(node: &BVHNode, bbox: &BoundingBox, result: &mut Vec<usize>) {
        if node.bbox.is_empty() || !node.bbox.intersects(bbox) {
            return;
        }

        if node.is_leaf() {
            result.extend_from_slice(&node.triangle_indices);
        } else {
            if let Some(ref left) = node.left {
                Self::query_recursive(left, bbox, result);
            }
            if let Some(ref right) = node.right {
                Self::query_recursive(right, bbox, result);
            }
        }
    }

    #[cfg(test)]
    pub fn root(&self) -> &BVHNode {
        &self.root
    }
}
