//! Annealing of spherical Gaussians `f_a(x) = exp(-a ||x||^2)`.
//!
//! - `a_0 = (n + 2 sqrt(n t) + 2 t) / (2 r0^2)`, `t = ln(1/delta)`: all but `delta`
//!   of the mass of `f_{a_0}` lies in `B(0, r0) ⊂ P`, so
//!   `∫_P f_{a_0} ≈ (pi / a_0)^{n/2}`.
//! - `a_{i+1} < a_i` is the smallest value whose weights
//!   `w = f_{a_{i+1}} / f_{a_i}` on samples of `f_{a_i}` keep
//!   `E[w^2] / E[w]^2 - 1 <= gaussian_var_bound` (bisection); the schedule ends
//!   with `a = 0`, the uniform measure.
//! - `vol(P) = (pi / a_0)^{n/2} * prod_i E_{a_i}[w_i]`.

use nalgebra::DVector;
use rand::Rng;

use super::{relative_standard_error, Ctx};
use crate::error::{PolyError, Result};
use crate::walks::GaussianWalk;

pub(super) fn cooling_gaussian<R: Rng + ?Sized>(ctx: &Ctx<'_>, rng: &mut R) -> Result<f64> {
    let n = ctx.dim() as f64;
    let t = (1.0 / ctx.cfg.gaussian_delta).ln();
    let a0 = (n + 2.0 * (n * t).sqrt() + 2.0 * t) / (2.0 * ctx.r0 * ctx.r0);
    let schedule = schedule(ctx, a0, rng)?;
    let m = schedule.len() - 1;
    tracing::debug!(phases = m, a0, "cooling gaussian schedule");

    let tol = ctx.ratio_tolerance(m);
    let mut log_vol = 0.5 * n * (std::f64::consts::PI / a0).ln();
    for pair in schedule.windows(2) {
        log_vol += log_ratio(ctx, pair[0], pair[1], tol, rng)?;
    }
    Ok(log_vol)
}

/// Squared norms of `count` points of the chain targeting `f_a` on `P`.
fn sample_sq_norms<R: Rng + ?Sized>(ctx: &Ctx<'_>, a: f64, count: usize, rng: &mut R) -> Result<Vec<f64>> {
    let kernel = ctx.gaussian_kernel(a);
    let mut x = DVector::zeros(ctx.dim());
    for _ in 0..ctx.cfg.burn_in_points * ctx.walk_len {
        kernel.step(ctx.poly, &mut x, a, rng)?;
    }
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        for _ in 0..ctx.walk_len {
            kernel.step(ctx.poly, &mut x, a, rng)?;
        }
        out.push(x.norm_squared());
    }
    Ok(out)
}

/// `E[w^2] / E[w]^2 - 1` for `w = exp((a - next) s)`, computed with a max shift.
fn relative_variance(sq: &[f64], a: f64, next: f64) -> f64 {
    let lw: Vec<f64> = sq.iter().map(|s| (a - next) * s).collect();
    let (mean, mean_sq) = shifted_moments(&lw);
    mean_sq / (mean * mean) - 1.0
}

/// `(mean(exp(lw - M)), mean(exp(2 (lw - M))))` with `M = max lw`.
fn shifted_moments(lw: &[f64]) -> (f64, f64) {
    let max = lw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let k = lw.len().max(1) as f64;
    let (s1, s2) = lw.iter().fold((0.0, 0.0), |(s1, s2), l| {
        let e = (l - max).exp();
        (s1 + e, s2 + e * e)
    });
    (s1 / k, s2 / k)
}

fn schedule<R: Rng + ?Sized>(ctx: &Ctx<'_>, a0: f64, rng: &mut R) -> Result<Vec<f64>> {
    let cfg = ctx.cfg;
    let bound = cfg.gaussian_var_bound;
    let mut out = vec![a0];
    for _ in 0..cfg.max_phases {
        let a = out[out.len() - 1];
        let sq = sample_sq_norms(ctx, a, cfg.schedule_points, rng)?;
        if relative_variance(&sq, a, 0.0) <= bound {
            out.push(0.0);
            return Ok(out);
        }
        // relvar grows as `next` moves away from `a`.
        let (mut lo, mut hi) = (0.0, a);
        for _ in 0..50 {
            let mid = 0.5 * (lo + hi);
            if relative_variance(&sq, a, mid) <= bound {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        out.push(hi.min(a * (1.0 - 1e-3)));
    }
    Err(PolyError::numerical(format!(
        "cooling gaussian schedule exceeded {} phases",
        cfg.max_phases
    )))
}

/// `ln E_{f_a}[f_next / f_a]`, sampled until the relative standard error of the
/// weights, over their effective sample size, is at most `tol`.
fn log_ratio<R: Rng + ?Sized>(ctx: &Ctx<'_>, a: f64, next: f64, tol: f64, rng: &mut R) -> Result<f64> {
    let cfg = ctx.cfg;
    let kernel = ctx.gaussian_kernel(a);
    let mut x = DVector::zeros(ctx.dim());
    for _ in 0..cfg.burn_in_points * ctx.walk_len {
        kernel.step(ctx.poly, &mut x, a, rng)?;
    }
    let mut lw = Vec::with_capacity(cfg.min_points_per_ratio);
    let mut next_check = cfg.min_points_per_ratio;
    loop {
        for _ in 0..ctx.walk_len {
            kernel.step(ctx.poly, &mut x, a, rng)?;
        }
        lw.push((a - next) * x.norm_squared());
        let total = lw.len();
        if total >= next_check {
            next_check = ctx.next_check(total);
            if relative_standard_error(&shifted_weights(&lw)) <= tol {
                break;
            }
        }
        if total >= cfg.max_points_per_ratio {
            tracing::warn!(a, next, total, "gaussian ratio hit the point cap");
            break;
        }
    }
    let max = lw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (mean, _) = shifted_moments(&lw);
    let out = max + mean.ln();
    if !out.is_finite() {
        return Err(PolyError::numerical("non-finite Gaussian ratio"));
    }
    tracing::debug!(a, next, log_ratio = out, points = lw.len(), "gaussian ratio");
    Ok(out)
}

/// `exp(lw - max lw)`, the weights up to a common factor.
fn shifted_weights(lw: &[f64]) -> Vec<f64> {
    let max = lw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    lw.iter().map(|l| (l - max).exp()).collect()
}
