use super::*;
use crate::polytope::special;
use nalgebra::{dmatrix, dvector, DMatrix, DVector};

fn both() -> [(InnerBallKind, f64); 2] {
    [(InnerBallKind::Fast, 1e-8), (InnerBallKind::Slow, 1e-3)]
}

#[test]
fn cube_chebyshev_ball() {
    let c = special::cube(4, 1.5);
    for (kind, tol) in both() {
        let ball = kind.inner_ball(&c).unwrap();
        assert!((ball.radius - 1.5).abs() < tol, "{kind:?}: r = {}", ball.radius);
        assert!(ball.center.norm() < 10.0 * tol, "{kind:?}");
    }
}

#[test]
fn simplex_inscribed_radius() {
    // Corner simplex in R^2: r = 1 / (2 + sqrt(2)).
    let s = special::simplex(2);
    let r_exact = 1.0 / (2.0 + 2f64.sqrt());
    for (kind, tol) in both() {
        let ball = kind.inner_ball(&s).unwrap();
        assert!((ball.radius - r_exact).abs() < tol, "{kind:?}: r = {}", ball.radius);
        assert!(s.facet_distance(&ball.center) >= ball.radius - 1e-12);
    }
}

#[test]
fn shifted_box_needs_phase_one() {
    // [2, 4] x [-1, 1]: the origin is infeasible, so the LP starts with artificials.
    let p = crate::polytope::HPolytope::new(
        dmatrix![1.0, 0.0; -1.0, 0.0; 0.0, 1.0; 0.0, -1.0],
        dvector![4.0, -2.0, 1.0, 1.0],
    )
    .unwrap();
    for (kind, tol) in both() {
        let ball = kind.inner_ball(&p).unwrap();
        assert!((ball.radius - 1.0).abs() < tol, "{kind:?}");
        assert!((ball.center[0] - 3.0).abs() < 1e-2, "{kind:?}");
    }
}

#[test]
fn empty_and_unbounded_are_degenerate() {
    let empty = crate::polytope::HPolytope::new(dmatrix![1.0; -1.0], dvector![0.0, -1.0]).unwrap();
    let halfplane = crate::polytope::HPolytope::new(dmatrix![1.0, 0.0], dvector![1.0]).unwrap();
    for (kind, _) in both() {
        assert!(
            matches!(kind.inner_ball(&empty), Err(PolyError::DegenerateSystem { .. })),
            "{kind:?} empty"
        );
        assert!(
            matches!(kind.inner_ball(&halfplane), Err(PolyError::DegenerateSystem { .. })),
            "{kind:?} unbounded"
        );
    }
}

#[test]
fn flat_body_has_no_interior() {
    // x = 0 written as two inequalities, y in [-1, 1].
    let p = crate::polytope::HPolytope::new(
        DMatrix::from_row_slice(4, 2, &[1.0, 0.0, -1.0, 0.0, 0.0, 1.0, 0.0, -1.0]),
        DVector::from_vec(vec![0.0, 0.0, 1.0, 1.0]),
    )
    .unwrap();
    assert!(matches!(
        InnerBallKind::Fast.inner_ball(&p),
        Err(PolyError::DegenerateSystem { .. })
    ));
}

#[test]
fn kind_parsing_and_names() {
    assert_eq!("FAST".parse::<InnerBallKind>().unwrap(), InnerBallKind::Fast);
    assert_eq!("geometric".parse::<InnerBallKind>().unwrap(), InnerBallKind::Slow);
    assert!("glpk".parse::<InnerBallKind>().is_err());
    assert_eq!(InnerBallKind::from_fast_mode(false).solver().name(), "geometric");
    assert_eq!(InnerBallKind::from_fast_mode(true).solver().name(), "lp");
}
