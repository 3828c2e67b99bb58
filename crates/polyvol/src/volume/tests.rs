use super::*;
use crate::inner_ball::InnerBallKind;
use crate::polytope::special;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn estimate(poly: &HPolytope, method: VolumeMethod, walk: VolumeWalk, eps: f64, seed: u64) -> f64 {
    let ball = InnerBallKind::Fast.inner_ball(poly).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    compute_volume(poly, method, walk, 1, eps, &ball, &VolumeCfg::default(), &mut rng).unwrap()
}

fn rel_err(est: f64, exact: f64) -> f64 {
    (est - exact).abs() / exact
}

#[test]
fn unit_cube_every_method() {
    let c = special::unit_cube(3);
    let cases = [
        (VolumeMethod::SequenceOfBalls, VolumeWalk::Cdhr),
        (VolumeMethod::SequenceOfBalls, VolumeWalk::Billiard),
        (VolumeMethod::CoolingBalls, VolumeWalk::Rdhr),
        (VolumeMethod::CoolingBalls, VolumeWalk::UniformBall),
        (VolumeMethod::CoolingGaussian, VolumeWalk::GaussianCdhr),
        (VolumeMethod::CoolingGaussian, VolumeWalk::GaussianRdhr),
    ];
    for (method, walk) in cases {
        let v = estimate(&c, method, walk, 0.1, 2024);
        assert!(rel_err(v, 1.0) < 0.25, "{method}/{walk}: {v}");
    }
}

#[test]
fn simplex_and_cross_polytope_volumes() {
    let s = special::simplex(3);
    let exact_s = 1.0 / special::factorial(3);
    let v = estimate(&s, VolumeMethod::CoolingBalls, VolumeWalk::Cdhr, 0.1, 5);
    assert!(rel_err(v, exact_s) < 0.25, "simplex: {v}");

    let x = special::cross_polytope(3);
    let exact_x = 8.0 / special::factorial(3);
    let v = estimate(&x, VolumeMethod::CoolingGaussian, VolumeWalk::GaussianCdhr, 0.1, 6);
    assert!(rel_err(v, exact_x) < 0.25, "cross polytope: {v}");
}

#[test]
fn most_seeds_land_within_epsilon() {
    // [-1,1] x [-1/4,1/4] x [-1,1], volume 2.
    let p = special::boxed(&[1.0, 0.25, 1.0]);
    for (method, walk) in [
        (VolumeMethod::SequenceOfBalls, VolumeWalk::Cdhr),
        (VolumeMethod::CoolingGaussian, VolumeWalk::GaussianCdhr),
    ] {
        let hits = (0..6)
            .filter(|&seed| rel_err(estimate(&p, method, walk, 0.1, seed), 2.0) < 0.1)
            .count();
        assert!(hits >= 5, "{method}/{walk}: only {hits}/6 runs within 10%");
    }
}

#[test]
fn standard_error_accounts_for_correlation() {
    let n = 2000;
    let alternating: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
    let blocks: Vec<f64> = (0..n).map(|i| ((i / 20) % 2) as f64).collect();
    // p = 1/2 in both; the iid value is sqrt((1 - p) / (p n)).
    let iid = (1.0 / n as f64).sqrt();
    assert!((relative_standard_error(&alternating) - iid).abs() < 1e-12);
    assert!(relative_standard_error(&blocks) > 2.0 * iid);
    assert_eq!(relative_standard_error(&[0.0; 50]), f64::INFINITY);
}

#[test]
fn incompatible_pairs_are_rejected_before_sampling() {
    let c = special::unit_cube(2);
    let ball = InnerBallKind::Fast.inner_ball(&c).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    for (method, walk) in [
        (VolumeMethod::CoolingGaussian, VolumeWalk::Cdhr),
        (VolumeMethod::SequenceOfBalls, VolumeWalk::GaussianBall),
        (VolumeMethod::CoolingBalls, VolumeWalk::GaussianRdhr),
    ] {
        let err = compute_volume(&c, method, walk, 1, 0.1, &ball, &VolumeCfg::default(), &mut rng).unwrap_err();
        assert!(matches!(err, PolyError::UnsupportedMethod { .. }), "{method}/{walk}");
    }
}

#[test]
fn parameters_are_validated() {
    let c = special::unit_cube(2);
    let ball = InnerBallKind::Fast.inner_ball(&c).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let cfg = VolumeCfg::default();
    for eps in [0.0, 1.0, f64::NAN] {
        let err = compute_volume(&c, VolumeMethod::CoolingBalls, VolumeWalk::Cdhr, 1, eps, &ball, &cfg, &mut rng)
            .unwrap_err();
        assert!(matches!(err, PolyError::InvalidParameter { name: "epsilon", .. }));
    }
    let bad_cfg = VolumeCfg {
        schedule_points: 0,
        ..cfg
    };
    assert!(compute_volume(&c, VolumeMethod::CoolingBalls, VolumeWalk::Cdhr, 1, 0.1, &ball, &bad_cfg, &mut rng).is_err());
}

#[test]
fn method_names_parse() {
    assert_eq!("cooling_balls".parse::<VolumeMethod>().unwrap(), VolumeMethod::CoolingBalls);
    assert_eq!("Sequence_Of_Balls".parse::<VolumeMethod>().unwrap(), VolumeMethod::SequenceOfBalls);
    assert!(matches!(
        "CB".parse::<VolumeMethod>(),
        Err(PolyError::UnsupportedMethod { .. })
    ));
}

#[test]
fn doubling_radii_shape() {
    let r = balls::doubling_radii(2, 1.0, 4.0);
    // k = ceil(2 * log2(4)) = 4: [4, 2^{3/2}, 2, 2^{1/2}, 1].
    assert_eq!(r.len(), 5);
    assert_eq!(r[0], 4.0);
    assert_eq!(r[4], 1.0);
    assert!(r.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(balls::doubling_radii(3, 1.0, 0.5), vec![1.0]);
}
