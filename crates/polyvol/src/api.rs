//! String-typed entry points for bindings and the CLI.
//!
//! Every method name is parsed into its enum, and every scalar argument checked,
//! before an inner ball is computed or an RNG is created, so a bad request fails
//! with `UnsupportedMethod` or `InvalidParameter` without touching the polytope. `fast_mode` picks the LP inner-ball supplier;
//! `seed = None` seeds from the wall clock.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::Result;
use crate::inner_ball::InnerBallKind;
use crate::mmcs::{run_mmcs, MmcsOutput, MmcsSettings};
use crate::polytope::HPolytope;
use crate::rounding::{Rounding, RoundingCfg, RoundingMethod};
use crate::stats::columns;
use crate::volume::{check_request, VolumeCfg, VolumeMethod, VolumeWalk};
use crate::walks::{seed_or_clock, SamplingParams, WalkType};

fn rng_for(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(seed_or_clock(seed))
}

pub fn compute_volume(
    poly: &HPolytope,
    volume_method: &str,
    walk_method: &str,
    walk_len: usize,
    epsilon: f64,
    seed: Option<u64>,
    fast_mode: bool,
) -> Result<f64> {
    let method: VolumeMethod = volume_method.parse()?;
    let walk: VolumeWalk = walk_method.parse()?;
    let cfg = VolumeCfg::default();
    check_request(method, walk, walk_len, epsilon, &cfg)?;
    let ball = InnerBallKind::from_fast_mode(fast_mode).inner_ball(poly)?;
    let mut rng = rng_for(seed);
    crate::volume::compute_volume(poly, method, walk, walk_len, epsilon, &ball, &cfg, &mut rng)
}

/// Uniform samples as a `d x N` matrix.
pub fn generate_samples(
    poly: &HPolytope,
    method: &str,
    number_of_points: usize,
    number_of_points_to_burn: usize,
    walk_len: usize,
    fast_mode: bool,
    seed: Option<u64>,
) -> Result<DMatrix<f64>> {
    let walk: WalkType = method.parse()?;
    let params = SamplingParams {
        walk_len,
        number_of_points,
        number_of_points_to_burn,
    };
    params.validate()?;
    let ball = InnerBallKind::from_fast_mode(fast_mode).inner_ball(poly)?;
    let mut rng = rng_for(seed);
    let pts = crate::walks::apply_sampling(poly, walk, &params, &ball.center, ball.radius, &mut rng)?;
    if pts.is_empty() {
        return Ok(DMatrix::zeros(poly.dimension(), 0));
    }
    Ok(columns(&pts))
}

pub fn rounding(poly: &HPolytope, method: &str, fast_mode: bool, seed: Option<u64>) -> Result<Rounding> {
    let method: RoundingMethod = method.parse()?;
    let ball = InnerBallKind::from_fast_mode(fast_mode).inner_ball(poly)?;
    let mut rng = rng_for(seed);
    crate::rounding::rounding(
        poly,
        method,
        &ball.center,
        ball.radius,
        &RoundingCfg::default(),
        &mut rng,
    )
}

fn mmcs_settings(ess: usize, psrf_check: bool, parallelism: bool, num_threads: usize, seed: Option<u64>) -> MmcsSettings {
    MmcsSettings {
        target_ess: ess,
        psrf_check,
        parallel: parallelism,
        num_threads,
        seed,
        ..MmcsSettings::default()
    }
}

pub fn fast_mmcs(
    poly: &HPolytope,
    ess: usize,
    psrf_check: bool,
    parallelism: bool,
    num_threads: usize,
    seed: Option<u64>,
) -> Result<MmcsOutput> {
    let s = mmcs_settings(ess, psrf_check, parallelism, num_threads, seed);
    run_mmcs(poly, &s, InnerBallKind::Fast)
}

pub fn slow_mmcs(
    poly: &HPolytope,
    ess: usize,
    psrf_check: bool,
    parallelism: bool,
    num_threads: usize,
    seed: Option<u64>,
) -> Result<MmcsOutput> {
    let s = mmcs_settings(ess, psrf_check, parallelism, num_threads, seed);
    run_mmcs(poly, &s, InnerBallKind::Slow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolyError;
    use crate::mmcs::MmcsOutcome;
    use crate::polytope::special;
    use nalgebra::{dmatrix, dvector};

    /// `x <= -1` and `x >= 1`: empty, so any geometry would fail with `DegenerateSystem`.
    fn empty() -> HPolytope {
        HPolytope::new(dmatrix![1.0; -1.0], dvector![-1.0, -1.0]).unwrap()
    }

    fn unsupported<T: std::fmt::Debug>(r: Result<T>) -> bool {
        matches!(r, Err(PolyError::UnsupportedMethod { .. }))
    }

    #[test]
    fn unknown_names_fail_before_any_geometry() {
        let p = empty();
        assert!(unsupported(compute_volume(&p, "banana", "CDHR", 1, 0.1, Some(0), true)));
        assert!(unsupported(compute_volume(&p, "cooling_balls", "gibbs", 1, 0.1, Some(0), true)));
        assert!(unsupported(generate_samples(&p, "hmc", 10, 0, 1, true, Some(0))));
        assert!(unsupported(rounding(&p, "svd", true, Some(0))));
        // Incompatible pairs and bad scalars are caught before the inner ball too.
        assert!(unsupported(compute_volume(&p, "cooling_gaussian", "CDHR", 1, 0.1, Some(0), true)));
        for (walk_len, eps) in [(1, 5.0), (0, 0.1)] {
            assert!(matches!(
                compute_volume(&p, "cooling_balls", "CDHR", walk_len, eps, Some(0), true),
                Err(PolyError::InvalidParameter { .. })
            ));
        }
        assert!(matches!(
            generate_samples(&p, "cdhr", 10, 0, 0, true, Some(0)),
            Err(PolyError::InvalidParameter { name: "walk_len", .. })
        ));
        // A known name reaches the inner-ball supplier and fails there.
        assert!(matches!(
            rounding(&p, "isotropic_position", true, Some(0)),
            Err(PolyError::DegenerateSystem { .. })
        ));
    }

    #[test]
    fn samples_are_columns_inside_the_polytope() {
        let p = special::cube(3, 2.0);
        for method in ["cdhr", "RDHR", "billiard_walk", "ball_walk", "dikin_walk", "john_walk", "vaidya_walk"] {
            let s = generate_samples(&p, method, 50, 5, 2, false, Some(1)).unwrap();
            assert_eq!(s.shape(), (3, 50), "{method}");
            for col in s.column_iter() {
                assert!(p.contains_eps(&col.into_owned(), 1e-9), "{method}");
            }
        }
        let again = generate_samples(&p, "cdhr", 50, 5, 2, false, Some(1)).unwrap();
        assert_eq!(again, generate_samples(&p, "cdhr", 50, 5, 2, false, Some(1)).unwrap());
        assert_eq!(generate_samples(&p, "cdhr", 0, 0, 1, true, Some(1)).unwrap().shape(), (3, 0));
    }

    #[test]
    fn facade_volume_and_rounding() {
        let p = special::cube(2, 1.0);
        let v = compute_volume(&p, "sequence_of_balls", "CDHR", 1, 0.1, Some(4), true).unwrap();
        assert!((v - 4.0).abs() / 4.0 < 0.25, "{v}");
        let r = rounding(&p, "john_position", true, Some(4)).unwrap();
        assert!(r.round_value > 0.0);
        assert_eq!(r.transform.shape(), (2, 2));
    }

    #[test]
    fn facade_mmcs_runs_both_suppliers() {
        let p = special::boxed(&[1.0, 0.5]);
        let fast = fast_mmcs(&p, 200, false, false, 1, Some(2)).unwrap();
        let slow = slow_mmcs(&p, 200, false, true, 2, Some(2)).unwrap();
        for out in [fast, slow] {
            assert_eq!(out.outcome, MmcsOutcome::Converged);
            assert!(out.samples.ncols() >= 200);
        }
    }
}
