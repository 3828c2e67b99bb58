use super::*;
use crate::error::PolyError;
use nalgebra::{dmatrix, dvector, DMatrix, DVector};
use proptest::prelude::*;

#[test]
fn new_rejects_row_mismatch() {
    let a = DMatrix::<f64>::identity(2, 2);
    let b = dvector![1.0, 1.0, 1.0];
    let err = HPolytope::new(a, b).unwrap_err();
    assert!(matches!(
        err,
        PolyError::DimensionMismatch {
            expected: 2,
            got: 3,
            ..
        }
    ));
}

#[test]
fn new_rejects_non_finite() {
    let a = dmatrix![1.0, f64::NAN; 0.0, 1.0];
    let err = HPolytope::new(a, dvector![1.0, 1.0]).unwrap_err();
    assert!(matches!(err, PolyError::NumericalFailure { .. }));
}

#[test]
fn from_rows_checks_ragged_input() {
    let rows = vec![vec![1.0, 0.0], vec![0.0]];
    assert!(HPolytope::from_rows(&rows, &[1.0, 1.0]).is_err());
    let ok = HPolytope::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]], &[1.0, 2.0]).unwrap();
    assert_eq!(ok.dimension(), 2);
    assert_eq!(ok.num_facets(), 2);
}

#[test]
fn cube_membership_and_chords() {
    let c = special::cube(3, 1.0);
    assert!(c.contains(&dvector![0.5, -0.5, 0.9]));
    assert!(!c.contains(&dvector![1.1, 0.0, 0.0]));
    assert!(c.is_interior(&DVector::zeros(3)));
    assert!((c.facet_distance(&dvector![0.5, 0.0, 0.0]) - 0.5).abs() < 1e-12);

    let (lo, hi) = c.line_intersect(&DVector::zeros(3), &dvector![1.0, 1.0, 0.0]);
    assert!((lo + 1.0).abs() < 1e-12 && (hi - 1.0).abs() < 1e-12);
    let (lo, hi) = c.coordinate_intersect(&dvector![0.25, 0.0, 0.0], 0);
    assert!((lo + 1.25).abs() < 1e-12 && (hi - 0.75).abs() < 1e-12);
}

#[test]
fn boundary_hit_reports_facet_normal() {
    let c = special::cube(2, 1.0);
    let (t, n) = c
        .boundary_hit(&dvector![0.0, 0.5], &dvector![0.0, 1.0])
        .expect("ray leaves the cube");
    assert!((t - 0.5).abs() < 1e-12);
    assert!((n - dvector![0.0, 1.0]).norm() < 1e-12);
}

#[test]
fn ball_polytope_takes_the_tighter_chord() {
    let c = special::cube(2, 1.0);
    let bp = BallPolytope::new(&c, Ball::new(DVector::zeros(2), 0.5));
    let (lo, hi) = bp.line_intersect(&DVector::zeros(2), &dvector![1.0, 0.0]);
    assert!((lo + 0.5).abs() < 1e-12 && (hi - 0.5).abs() < 1e-12);
    assert!(bp.contains(&dvector![0.3, 0.3]));
    assert!(!bp.contains(&dvector![0.6, 0.0]));
    let (t, n) = bp
        .boundary_hit(&DVector::zeros(2), &dvector![0.0, 1.0])
        .unwrap();
    assert!((t - 0.5).abs() < 1e-12);
    assert!((n - dvector![0.0, 1.0]).norm() < 1e-12);
}

#[test]
fn linear_transform_maps_points_consistently() {
    let p = special::simplex(3);
    let t = dmatrix![2.0, 0.0, 0.0; 0.5, 1.0, 0.0; 0.0, 0.0, 0.25];
    let shift = dvector![0.1, 0.1, 0.1];
    let q = p.linear_transform(&t, &shift).unwrap();
    // y in Q  <=>  T y + shift in P
    let y = dvector![0.01, 0.02, 0.3];
    assert_eq!(q.contains(&y), p.contains(&(&t * &y + &shift)));
    assert!(p.linear_transform(&DMatrix::identity(2, 2), &shift).is_err());
}

#[test]
fn normalized_rows_have_unit_norm() {
    let p = HPolytope::new(dmatrix![3.0, 4.0; 0.0, -2.0], dvector![5.0, 2.0]).unwrap();
    let q = p.normalized();
    for nrm in q.row_norms().iter() {
        assert!((nrm - 1.0).abs() < 1e-12);
    }
    assert!((q.b()[0] - 1.0).abs() < 1e-12);
}

#[test]
fn lowdim_projection_of_a_slice() {
    // Unit cube in R^3 cut by x + y + z = 1.5 is a hexagon.
    let c = special::unit_cube(3);
    let (a, b) = c.clone().into_matrices();
    let ld = LowDimHPolytope::new(a, b, dmatrix![1.0, 1.0, 1.0], dvector![1.5]).unwrap();
    let proj = ld.full_dimensional_polytope().unwrap();
    assert_eq!(proj.polytope.dimension(), 2);
    assert_eq!(proj.n_extra_trans.shape(), (3, 2));
    let x = proj.lift(&DVector::zeros(2));
    assert!((x.sum() - 1.5).abs() < 1e-9);
}

#[test]
fn lowdim_keeps_every_null_direction() {
    let (a, b) = special::cube(4, 1.0).into_matrices();
    for (aeq, beq, dim) in [
        (dmatrix![0.0, 1.128, -1.70, 1.68], dvector![0.05], 3),
        (dmatrix![1.0, 2.0, 3.0, 4.0; 0.5, -1.0, 0.25, 0.0], dvector![0.1, 0.0], 2),
    ] {
        let ld = LowDimHPolytope::new(a.clone(), b.clone(), aeq.clone(), beq).unwrap();
        let proj = ld.full_dimensional_polytope().unwrap();
        assert_eq!(proj.polytope.dimension(), dim);
        let n = &proj.n_extra_trans;
        assert!((n.tr_mul(n) - DMatrix::<f64>::identity(dim, dim)).norm() < 1e-10);
        assert!((&aeq * n).norm() < 1e-10);
    }
}

#[test]
fn lowdim_rejects_full_rank_and_inconsistent_equalities() {
    let c = special::cube(2, 1.0);
    let (a, b) = c.into_matrices();
    let full = LowDimHPolytope::new(
        a.clone(),
        b.clone(),
        DMatrix::identity(2, 2),
        dvector![0.0, 0.0],
    )
    .unwrap();
    assert!(matches!(
        full.full_dimensional_polytope(),
        Err(PolyError::DegenerateSystem { .. })
    ));
    let inconsistent =
        LowDimHPolytope::new(a, b, dmatrix![1.0, 0.0; 2.0, 0.0], dvector![0.0, 1.0]).unwrap();
    assert!(matches!(
        inconsistent.full_dimensional_polytope(),
        Err(PolyError::DegenerateSystem { .. })
    ));
}

#[test]
fn lowdim_shape_mismatch() {
    let c = special::cube(2, 1.0);
    let (a, b) = c.into_matrices();
    let err = LowDimHPolytope::new(a, b, dmatrix![1.0, 1.0, 1.0], dvector![0.0]).unwrap_err();
    assert!(matches!(err, PolyError::DimensionMismatch { .. }));
}

#[test]
fn special_volumes_helpers() {
    assert_eq!(special::factorial(5), 120.0);
    assert_eq!(special::cross_polytope(3).num_facets(), 8);
    assert_eq!(special::simplex(4).num_facets(), 5);
    assert_eq!(special::boxed(&[1.0, 2.0]).num_facets(), 4);
}

proptest! {
    #[test]
    fn lifted_points_satisfy_equalities(
        w in prop::collection::vec(-2.0f64..2.0, 4),
        c in 0.5f64..2.5,
        y in prop::collection::vec(-0.1f64..0.1, 3),
    ) {
        prop_assume!(w.iter().map(|v| v * v).sum::<f64>() > 0.1);
        let cube = special::cube(4, 1.0);
        let (a, b) = cube.into_matrices();
        let aeq = DMatrix::from_row_slice(1, 4, &w);
        let beq = dvector![c * 0.1];
        let ld = LowDimHPolytope::new(a, b, aeq.clone(), beq.clone()).unwrap();
        let proj = ld.full_dimensional_polytope().unwrap();
        prop_assert_eq!(proj.polytope.dimension(), 3);
        let x = proj.lift(&DVector::from_vec(y));
        prop_assert!(((&aeq * &x) - &beq).norm() < 1e-8);
    }

    #[test]
    fn transform_membership_agrees(
        diag in prop::collection::vec(0.2f64..3.0, 3),
        y in prop::collection::vec(-1.0f64..1.0, 3),
    ) {
        let p = special::cube(3, 1.0);
        let t = DMatrix::from_diagonal(&DVector::from_vec(diag));
        let shift = dvector![0.1, -0.2, 0.05];
        let q = p.linear_transform(&t, &shift).unwrap();
        let y = DVector::from_vec(y);
        let x = &t * &y + &shift;
        // Skip points within tolerance of the boundary.
        prop_assume!(p.facet_distance(&x).abs() > 1e-6);
        prop_assert_eq!(q.contains(&y), p.contains(&x));
    }
}
