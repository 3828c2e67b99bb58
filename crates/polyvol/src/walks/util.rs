//! Random primitives shared by the kernels.

use nalgebra::DVector;
use rand::Rng;
use rand_distr::{Exp1, StandardNormal};

/// Uniform unit vector in `R^n`.
pub(crate) fn random_direction<R: Rng + ?Sized>(n: usize, rng: &mut R) -> DVector<f64> {
    loop {
        let v = DVector::from_fn(n, |_, _| rng.sample::<f64, _>(StandardNormal));
        let nrm = v.norm();
        if nrm > 1e-300 {
            return v / nrm;
        }
    }
}

/// Uniform point in the unit ball of `R^n`.
pub(crate) fn random_in_ball<R: Rng + ?Sized>(n: usize, rng: &mut R) -> DVector<f64> {
    let u: f64 = rng.gen();
    random_direction(n, rng) * u.powf(1.0 / n as f64)
}

/// Uniform draw from `[lo, hi]`; collapses to `lo` for empty or inverted intervals.
pub(crate) fn uniform_in<R: Rng + ?Sized>(lo: f64, hi: f64, rng: &mut R) -> f64 {
    if hi > lo {
        lo + (hi - lo) * rng.gen::<f64>()
    } else {
        lo
    }
}

/// Standard normal truncated to `[l, u]`.
///
/// Branches
/// - `0 ∈ [l, u]`, width > 2: plain normal draws, reject outside.
/// - `0 ∈ [l, u]`, narrow: uniform proposal, accept `exp(-z^2/2)`.
/// - `0 < l`, `u^2 - l^2 <= 2`: uniform proposal, accept `exp((l^2 - z^2)/2)`.
/// - `0 < l`, otherwise: Robert (1995) shifted exponential, rate `(l + sqrt(l^2 + 4))/2`.
/// - `u < 0`: mirror.
pub(crate) fn truncated_standard_normal<R: Rng + ?Sized>(l: f64, u: f64, rng: &mut R) -> f64 {
    if l.is_nan() || u.is_nan() || u <= l {
        return l;
    }
    if u < 0.0 {
        return -truncated_standard_normal(-u, -l, rng);
    }
    if l <= 0.0 {
        if u - l > 2.0 {
            loop {
                let z: f64 = rng.sample(StandardNormal);
                if z >= l && z <= u {
                    return z;
                }
            }
        }
        loop {
            let z = uniform_in(l, u, rng);
            if rng.gen::<f64>() <= (-0.5 * z * z).exp() {
                return z;
            }
        }
    }
    if u * u - l * l <= 2.0 {
        loop {
            let z = uniform_in(l, u, rng);
            if rng.gen::<f64>() <= (0.5 * (l * l - z * z)).exp() {
                return z;
            }
        }
    }
    let alpha = 0.5 * (l + (l * l + 4.0).sqrt());
    loop {
        let e: f64 = rng.sample(Exp1);
        let z = l + e / alpha;
        if z <= u && rng.gen::<f64>() <= (-0.5 * (z - alpha).powi(2)).exp() {
            return z;
        }
    }
}

/// Normal `N(mean, sd^2)` truncated to `[lo, hi]`.
pub(crate) fn truncated_normal<R: Rng + ?Sized>(mean: f64, sd: f64, lo: f64, hi: f64, rng: &mut R) -> f64 {
    mean + sd * truncated_standard_normal((lo - mean) / sd, (hi - mean) / sd, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn truncated_draws_stay_in_range_on_every_branch() {
        let mut rng = StdRng::seed_from_u64(11);
        let cases = [
            (-3.0, 3.0),
            (-0.5, 0.7),
            (0.2, 1.0),
            (2.0, 8.0),
            (-9.0, -4.0),
            (5.0, f64::INFINITY),
            (f64::NEG_INFINITY, f64::INFINITY),
        ];
        for (l, u) in cases {
            for _ in 0..500 {
                let z = truncated_standard_normal(l, u, &mut rng);
                assert!(z >= l && z <= u, "{z} not in [{l}, {u}]");
            }
        }
    }

    #[test]
    fn tail_mean_matches_mills_ratio() {
        // E[Z | Z > 2] = phi(2) / (1 - Phi(2)) ≈ 2.3732.
        let mut rng = StdRng::seed_from_u64(5);
        let n = 20_000;
        let mean = (0..n)
            .map(|_| truncated_standard_normal(2.0, f64::INFINITY, &mut rng))
            .sum::<f64>()
            / n as f64;
        assert!((mean - 2.3732).abs() < 0.02, "mean = {mean}");
    }

    #[test]
    fn ball_points_are_inside() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(random_in_ball(5, &mut rng).norm() <= 1.0);
            assert!((random_direction(5, &mut rng).norm() - 1.0).abs() < 1e-12);
        }
    }
}
