// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end combination tests on closed primitives

use anyhow::Result;
use approx::assert_relative_eq;
use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use polyframe_combiner::combiner::{
    classify_point, BruteForce, BvhCulled, Classification, CutContext, Model,
    Triangle as SourceTriangle,
};
use polyframe_combiner::geometry::{perform_boolean_operation_with, MeshBuffer};
use polyframe_combiner::{
    BooleanMesh, BooleanOp, CombineError, CombineReport, Mesh, MeshBooleanOperator,
    ParallelBooleanExecutor, Primitive,
};

const EPS: f64 = 1e-5;
const ALL_OPS: [BooleanOp; 4] = [
    BooleanOp::Union,
    BooleanOp::Difference,
    BooleanOp::DifferenceInv,
    BooleanOp::Intersection,
];

fn operator() -> MeshBooleanOperator {
    MeshBooleanOperator::with_precision(EPS).expect("valid precision")
}

fn unit_cube_at(x: f64, y: f64, z: f64) -> Mesh {
    Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false)
        .to_mesh()
        .with_position(Vector3::new(x, y, z))
}

fn surface_area(mesh: &Mesh) -> f64 {
    mesh.world_triangles().iter().map(|t| t.area()).sum()
}

/// Enclosed volume by the divergence theorem; positive for outward winding
fn signed_volume(mesh: &Mesh) -> f64 {
    mesh.world_triangles()
        .iter()
        .map(|t| {
            let [a, b, c] = t.points();
            a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
        })
        .sum()
}

/// World-space triangles with corners rotated to start at the smallest one,
/// so equal sets compare equal regardless of starting corner but not of winding
fn winding_set(mesh: &Mesh) -> Vec<[[i64; 3]; 3]> {
    let mut set: Vec<[[i64; 3]; 3]> = mesh
        .world_triangles()
        .iter()
        .map(|t| {
            let corners: [[i64; 3]; 3] =
                t.points().map(|p| p.coords.map(|c| (c * 1e6).round() as i64).into());
            let start = (0..3).min_by_key(|&i| corners[i]).unwrap_or(0);
            [0, 1, 2].map(|i| corners[(start + i) % 3])
        })
        .collect();
    set.sort();
    set
}

fn source_triangles(mesh: &Mesh) -> Vec<SourceTriangle> {
    mesh.world_triangles()
        .into_iter()
        .map(|coords| SourceTriangle::new(0, [0, 1, 2], coords))
        .collect()
}

#[test]
fn test_disjoint_union_passes_through() -> Result<()> {
    let mut a = unit_cube_at(0.0, 0.0, 0.0);
    let mut b = unit_cube_at(4.0, 0.0, 0.0);
    let (area_a, area_b) = (surface_area(&a), surface_area(&b));
    let (winding_a, winding_b) = (winding_set(&a), winding_set(&b));

    let report = operator().combine_models(&mut a, &mut b, BooleanOp::Union)?;

    assert_eq!(a.triangle_count(), 12);
    assert_eq!(b.triangle_count(), 12);
    assert_eq!(a.vertex_count(), 24);
    assert_eq!(b.vertex_count(), 24);
    assert_eq!(winding_set(&a), winding_a);
    assert_eq!(winding_set(&b), winding_b);
    assert_relative_eq!(surface_area(&a), area_a, epsilon = 1e-12);
    assert_relative_eq!(surface_area(&b), area_b, epsilon = 1e-12);
    assert_eq!(report.model_a.untouched_faces, 6);
    assert_eq!(report.model_b.untouched_faces, 6);
    assert_eq!(report.model_a.cut_lines + report.model_b.cut_lines, 0);
    Ok(())
}

#[test]
fn test_overlapping_cubes_union() -> Result<()> {
    let mut a = unit_cube_at(0.0, 0.0, 0.0);
    let mut b = unit_cube_at(0.5, 0.5, 0.5);

    let report = operator().combine_models(&mut a, &mut b, BooleanOp::Union)?;

    for model in [&report.model_a, &report.model_b] {
        assert_eq!(model.faces, 6);
        assert_eq!(model.untouched_faces, 3);
        assert_eq!(model.cut_lines, 6);
        assert_eq!(model.cut_vertices, 9);
        assert_eq!(model.orig_vertices, 21);
        assert_eq!(model.final_triangles, 18);
        assert_eq!(model.degenerate_faces, 0);
        assert_eq!(model.rejections.ambiguous, 0);
    }

    // Each cube loses the three quarter-sides hidden inside the other
    assert_eq!(a.triangle_count(), 18);
    assert_eq!(b.triangle_count(), 18);
    assert_relative_eq!(surface_area(&a), 5.25, epsilon = 1e-9);
    assert_relative_eq!(surface_area(&b), 5.25, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_overlapping_cubes_intersection() -> Result<()> {
    let mut a = unit_cube_at(0.0, 0.0, 0.0);
    let mut b = unit_cube_at(0.5, 0.5, 0.5);

    operator().combine_models(&mut a, &mut b, BooleanOp::Intersection)?;

    assert_eq!(a.triangle_count(), 6);
    assert_eq!(b.triangle_count(), 6);
    assert_relative_eq!(surface_area(&a), 0.75, epsilon = 1e-9);
    assert_relative_eq!(surface_area(&b), 0.75, epsilon = 1e-9);
    for tri in a.world_triangles() {
        let center = tri.center();
        assert!(center.x >= 0.5 && center.y >= 0.5 && center.z >= 0.5);
    }
    Ok(())
}

#[test]
fn test_result_volumes() -> Result<()> {
    let a = unit_cube_at(0.0, 0.0, 0.0);
    let b = unit_cube_at(0.5, 0.5, 0.5);
    let operator = operator();

    let expected = [1.875, 0.875, 0.875, 0.125];
    for (op, volume) in ALL_OPS.into_iter().zip(expected) {
        let (result, _) = perform_boolean_operation_with(&operator, &a, &b, op)?;
        assert_relative_eq!(signed_volume(&result), volume, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn test_half_offset_cubes_union_faces() -> Result<()> {
    // Shifted by half a width along x: four sides of each cube overlap
    // coplanar sides of the other
    let mut a = Model::new(&unit_cube_at(0.0, 0.0, 0.0))?;
    let mut b = Model::new(&unit_cube_at(0.5, 0.0, 0.0))?;
    a.create_faces(EPS);
    b.create_faces(EPS);

    let operator = operator();
    operator.cut_model(&mut a, &b, &CutContext::for_operand(EPS, true, true, true));
    operator.cut_model(&mut b, &a, &CutContext::for_operand(EPS, true, true, false));

    for (model, opposite) in [(&a, &b), (&b, &a)] {
        let untouched = model.faces().iter().filter(|f| !f.is_touched()).count();
        assert_eq!(untouched, 1);
        for face in model.faces() {
            assert_eq!(face.cut_lines.is_empty(), !face.is_touched());
            for tri in &face.final_triangles {
                assert_ne!(
                    opposite.classify(&tri.coords.center(), EPS),
                    Classification::Inside
                );
            }
        }
        assert_eq!(model.report().untouched_faces, 1);
    }
    Ok(())
}

#[test]
fn test_half_offset_cubes_all_operations() -> Result<()> {
    let a = unit_cube_at(0.0, 0.0, 0.0);
    let b = unit_cube_at(0.5, 0.0, 0.0);
    let operator = operator();

    // (area, volume): a 1.5 long box, then three half-width boxes
    let expected = [(8.0, 1.5), (4.0, 0.5), (4.0, 0.5), (4.0, 0.5)];
    let mut volumes = Vec::new();
    for (op, (area, volume)) in ALL_OPS.into_iter().zip(expected) {
        let (result, _) = perform_boolean_operation_with(&operator, &a, &b, op)?;
        assert_relative_eq!(surface_area(&result), area, epsilon = 1e-9);
        assert_relative_eq!(signed_volume(&result), volume, epsilon = 1e-9);
        volumes.push(signed_volume(&result));
    }

    // Both differences and the intersection fill the union exactly once
    assert_relative_eq!(volumes[1] + volumes[2] + volumes[3], volumes[0], epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_half_offset_union_and_intersection_tile_both_surfaces() -> Result<()> {
    let a = unit_cube_at(0.0, 0.0, 0.0);
    let b = unit_cube_at(0.5, 0.0, 0.0);
    let operator = operator();

    let (union, _) = perform_boolean_operation_with(&operator, &a, &b, BooleanOp::Union)?;
    let (intersection, _) =
        perform_boolean_operation_with(&operator, &a, &b, BooleanOp::Intersection)?;

    assert_relative_eq!(
        surface_area(&union) + surface_area(&intersection),
        surface_area(&a) + surface_area(&b),
        epsilon = 1e-9
    );
    for tri in intersection.world_triangles() {
        let center = tri.center();
        assert!(center.x >= 0.5 - EPS && center.x <= 1.0 + EPS);
    }
    Ok(())
}

#[test]
fn test_touching_cubes() -> Result<()> {
    // Face to face along x = 1: the shared side belongs to neither union nor intersection
    let a = unit_cube_at(0.0, 0.0, 0.0);
    let b = unit_cube_at(1.0, 0.0, 0.0);
    let operator = operator();

    let expected = [(10.0, 2.0), (6.0, 1.0), (6.0, 1.0), (0.0, 0.0)];
    for (op, (area, volume)) in ALL_OPS.into_iter().zip(expected) {
        let (result, _) = perform_boolean_operation_with(&operator, &a, &b, op)?;
        assert_relative_eq!(surface_area(&result), area, epsilon = 1e-9);
        assert_relative_eq!(signed_volume(&result), volume, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn test_surfaces_keep_their_attributes() -> Result<()> {
    let red = [255, 0, 0, 255];
    let blue = [0, 0, 255, 255];
    let cube_buffer = |color: [u8; 4], offset: Vector3<f64>| -> MeshBuffer {
        let mut buffer = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false)
            .to_mesh()
            .buffers
            .remove(0);
        buffer.transform(&Matrix4::new_translation(&offset));
        buffer.vertices = buffer.vertices.into_iter().map(|v| v.with_color(color)).collect();
        buffer
    };

    let mut a = Mesh::new();
    assert_eq!(a.add_buffer(cube_buffer(red, Vector3::zeros())), 0);
    assert_eq!(a.add_buffer(cube_buffer(blue, Vector3::new(3.0, 0.0, 0.0))), 1);
    let mut b = unit_cube_at(0.5, 0.5, 0.5);

    let report = operator().combine_models(&mut a, &mut b, BooleanOp::Union)?;

    // Faces never span surfaces: the far cube passes through untouched
    assert_eq!(report.model_a.faces, 12);
    assert_eq!(report.model_a.untouched_faces, 9);
    assert_eq!(a.buffers.len(), 2);
    assert_eq!(a.buffers[0].triangles.len(), 18);
    assert_eq!(a.buffers[1].triangles.len(), 12);
    assert!(a.buffers[0].vertices.iter().all(|v| v.color == red));
    assert!(a.buffers[1].vertices.iter().all(|v| v.color == blue));
    Ok(())
}

#[test]
fn test_union_keeps_nothing_inside_the_other_solid() -> Result<()> {
    let a_in = unit_cube_at(0.0, 0.0, 0.0);
    let b_in = unit_cube_at(0.3, 0.2, 0.6);
    let (opposite_a, opposite_b) = (source_triangles(&a_in), source_triangles(&b_in));

    let (mut a, mut b) = (a_in.clone(), b_in.clone());
    operator().combine_models(&mut a, &mut b, BooleanOp::Union)?;

    for tri in a.world_triangles() {
        assert_ne!(
            classify_point(&tri.center(), &opposite_b, EPS),
            Classification::Inside
        );
    }
    for tri in b.world_triangles() {
        assert_ne!(
            classify_point(&tri.center(), &opposite_a, EPS),
            Classification::Inside
        );
    }
    Ok(())
}

#[test]
fn test_union_is_commutative() -> Result<()> {
    let a = unit_cube_at(0.0, 0.0, 0.0);
    let b = unit_cube_at(0.3, 0.2, 0.6);
    let operator = operator();

    let (ab, report_ab) = perform_boolean_operation_with(&operator, &a, &b, BooleanOp::Union)?;
    let (ba, report_ba) = perform_boolean_operation_with(&operator, &b, &a, BooleanOp::Union)?;

    assert_eq!(ab.triangle_count(), ba.triangle_count());
    assert_eq!(report_ab.model_a, report_ba.model_b);
    assert_relative_eq!(signed_volume(&ab), signed_volume(&ba), epsilon = 1e-9);
    assert_relative_eq!(signed_volume(&ab), 1.776, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_difference_and_inverse_difference_mirror() -> Result<()> {
    let a = unit_cube_at(0.0, 0.0, 0.0);
    let b = unit_cube_at(0.3, 0.2, 0.6);
    let operator = operator();

    let (a_minus_b, _) = perform_boolean_operation_with(&operator, &a, &b, BooleanOp::Difference)?;
    let (b_minus_a, _) =
        perform_boolean_operation_with(&operator, &b, &a, BooleanOp::DifferenceInv)?;

    assert_relative_eq!(signed_volume(&a_minus_b), 0.776, epsilon = 1e-9);
    assert_relative_eq!(signed_volume(&b_minus_a), 0.776, epsilon = 1e-9);
    assert_relative_eq!(surface_area(&a_minus_b), surface_area(&b_minus_a), epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_rotated_operand() -> Result<()> {
    let a = unit_cube_at(0.0, 0.0, 0.0);
    let mut b = unit_cube_at(0.5, 0.3, 0.4);
    b.rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 30f64.to_radians());
    let operator = operator();

    let mut volumes = Vec::new();
    for op in ALL_OPS {
        let (mut a_out, mut b_out) = (a.clone(), b.clone());
        operator.combine_models(&mut a_out, &mut b_out, op)?;
        assert_eq!(b_out.rotation, UnitQuaternion::identity());
        assert_eq!(b_out.scale, Vector3::repeat(1.0));
        assert_eq!(b_out.position, b.position);

        a_out.merge(&b_out);
        volumes.push(signed_volume(&a_out));
    }

    let [union, difference, difference_inv, intersection]: [f64; 4] =
        volumes.try_into().expect("one volume per operation");
    assert_relative_eq!(union + intersection, 2.0, epsilon = 1e-9);
    assert_relative_eq!(difference + intersection, 1.0, epsilon = 1e-9);
    assert_relative_eq!(difference_inv + intersection, 1.0, epsilon = 1e-9);
    assert!(intersection > 0.0);
    Ok(())
}

#[test]
fn test_sphere_cube_partitions_both_surfaces() -> Result<()> {
    let cube = unit_cube_at(0.0, 0.0, 0.0);
    let sphere = Primitive::sphere(0.6, 12)
        .to_mesh()
        .with_position(Vector3::new(1.1, 0.93, 1.07));
    let (cube_area, sphere_area) = (surface_area(&cube), surface_area(&sphere));
    let operator = operator();

    let (mut cube_out, mut sphere_out) = (cube.clone(), sphere.clone());
    operator.combine_models(&mut cube_out, &mut sphere_out, BooleanOp::Union)?;
    let (mut cube_in, mut sphere_in) = (cube.clone(), sphere.clone());
    operator.combine_models(&mut cube_in, &mut sphere_in, BooleanOp::Intersection)?;

    // Outside and inside parts tile each original surface
    assert_relative_eq!(
        surface_area(&cube_out) + surface_area(&cube_in),
        cube_area,
        epsilon = 1e-6
    );
    assert_relative_eq!(
        surface_area(&sphere_out) + surface_area(&sphere_in),
        sphere_area,
        epsilon = 1e-6
    );
    assert!(surface_area(&sphere_in) > 0.0);
    Ok(())
}

#[test]
fn test_bvh_culling_matches_brute_force() -> Result<()> {
    let a = unit_cube_at(0.0, 0.0, 0.0);
    let sphere = Primitive::sphere(0.6, 12)
        .to_mesh()
        .with_position(Vector3::new(1.1, 0.93, 1.07));
    let shifted = unit_cube_at(0.5, 0.0, 0.0);

    let brute = operator().with_intersection_strategy(BruteForce);
    let bvh = operator().with_intersection_strategy(BvhCulled);

    for (b, op) in [&sphere, &shifted]
        .into_iter()
        .flat_map(|b| ALL_OPS.map(|op| (b, op)))
    {
        let (mesh_brute, report_brute) = perform_boolean_operation_with(&brute, &a, b, op)?;
        let (mesh_bvh, report_bvh) = perform_boolean_operation_with(&bvh, &a, b, op)?;
        assert_eq!(mesh_brute, mesh_bvh, "{:?}", op);
        assert_eq!(report_brute.model_a, report_bvh.model_a);
        assert_eq!(report_brute.model_b, report_bvh.model_b);
        assert_eq!(report_bvh.intersection_strategy, "bvh");
    }
    Ok(())
}

#[test]
fn test_operator_is_reentrant() -> Result<()> {
    let a = unit_cube_at(0.0, 0.0, 0.0);
    let b = unit_cube_at(0.5, 0.5, 0.5);

    let executor = ParallelBooleanExecutor::new(operator());
    let first = perform_boolean_operation_with(executor.operator(), &a, &b, BooleanOp::Difference)?;

    let pairs = vec![(a.clone(), b.clone()); 8];
    for result in executor.combine_pairs(&pairs, BooleanOp::Difference) {
        let (mesh, report) = result?;
        assert_eq!(mesh, first.0);
        assert_eq!(report, first.1);
    }
    Ok(())
}

#[test]
fn test_invalid_index_leaves_meshes_untouched() {
    let mut a = unit_cube_at(0.0, 0.0, 0.0);
    let mut b = unit_cube_at(0.5, 0.5, 0.5);
    b.buffer_mut(0).triangles[3].indices = [0, 1, 24];
    let (a_before, b_before) = (a.clone(), b.clone());

    let err = operator()
        .combine_models(&mut a, &mut b, BooleanOp::Intersection)
        .unwrap_err();

    assert_eq!(
        err,
        CombineError::IndexOutOfRange {
            surface: 0,
            triangle: 3,
            index: 24,
            vertex_count: 24,
        }
    );
    assert_eq!(a, a_before);
    assert_eq!(b, b_before);
}

#[test]
fn test_tiny_precision_still_completes() -> Result<()> {
    let mut a = unit_cube_at(0.0, 0.0, 0.0);
    let mut b = unit_cube_at(0.5, 0.5, 0.5);
    let operator = MeshBooleanOperator::with_precision(1e-14)?;

    operator.combine_models(&mut a, &mut b, BooleanOp::Union)?;
    assert!(a.triangle_count() > 0);
    assert!(b.triangle_count() > 0);
    Ok(())
}

#[test]
fn test_report_serializes_to_json() -> Result<()> {
    let mut a = unit_cube_at(0.0, 0.0, 0.0);
    let mut b = unit_cube_at(0.5, 0.5, 0.5);
    let report = operator().combine_models(&mut a, &mut b, BooleanOp::DifferenceInv)?;

    let json = serde_json::to_string_pretty(&report)?;
    assert!(json.contains("\"DifferenceInv\""));
    assert!(json.contains("\"cut_lines\""));

    let parsed: CombineReport = serde_json::from_str(&json)?;
    assert_eq!(parsed, report);
    Ok(())
}
