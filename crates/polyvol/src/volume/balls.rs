//! Ball schedules: shared ratio estimator and the fixed `2^{1/n}` sequence.

use nalgebra::DVector;
use rand::Rng;

use super::{relative_standard_error, Ctx};
use crate::error::{PolyError, Result};
use crate::linalg::log_ball_volume;
use crate::polytope::{Ball, BallPolytope};
use crate::walks::Walk;

/// Norms of `count` walk points of `P ∩ B(0, outer)` started at the origin.
pub(super) fn sample_norms<R: Rng + ?Sized>(
    ctx: &Ctx<'_>,
    outer: f64,
    count: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let n = ctx.dim();
    let body = BallPolytope::new(ctx.poly, Ball::new(DVector::zeros(n), outer));
    let kernel = ctx.uniform_kernel(outer);
    let mut x = DVector::zeros(n);
    for _ in 0..ctx.cfg.burn_in_points * ctx.walk_len {
        kernel.step(&body, &mut x, rng)?;
    }
    let mut norms = Vec::with_capacity(count);
    for _ in 0..count {
        for _ in 0..ctx.walk_len {
            kernel.step(&body, &mut x, rng)?;
        }
        norms.push(x.norm());
    }
    Ok(norms)
}

/// Enclosing radius estimated from samples of the whole polytope.
pub(super) fn enclosing_radius<R: Rng + ?Sized>(ctx: &Ctx<'_>, rng: &mut R) -> Result<f64> {
    let norms = sample_norms(ctx, f64::INFINITY, ctx.cfg.schedule_points, rng)?;
    let max = norms.iter().copied().fold(0.0, f64::max);
    if !max.is_finite() {
        return Err(PolyError::numerical("walk left every bounded region"));
    }
    Ok((ctx.cfg.radius_margin * max).max(ctx.r0))
}

/// `vol(P ∩ B(inner)) / vol(P ∩ B(outer))` from the fraction of walk points of
/// `P ∩ B(outer)` inside `B(inner)`; sampling stops once the relative standard
/// error of the hit indicator, over its effective sample size, drops to `tol`.
pub(super) fn ball_ratio<R: Rng + ?Sized>(
    ctx: &Ctx<'_>,
    outer: f64,
    inner: f64,
    tol: f64,
    rng: &mut R,
) -> Result<f64> {
    let n = ctx.dim();
    let cfg = ctx.cfg;
    let body = BallPolytope::new(ctx.poly, Ball::new(DVector::zeros(n), outer));
    let kernel = ctx.uniform_kernel(outer);
    let mut x = DVector::zeros(n);
    for _ in 0..cfg.burn_in_points * ctx.walk_len {
        kernel.step(&body, &mut x, rng)?;
    }
    let mut hits: Vec<f64> = Vec::with_capacity(cfg.min_points_per_ratio);
    let mut next_check = cfg.min_points_per_ratio;
    loop {
        for _ in 0..ctx.walk_len {
            kernel.step(&body, &mut x, rng)?;
        }
        hits.push(if x.norm() <= inner { 1.0 } else { 0.0 });
        let total = hits.len();
        if total >= next_check {
            next_check = ctx.next_check(total);
            if relative_standard_error(&hits) <= tol {
                break;
            }
        }
        if total >= cfg.max_points_per_ratio {
            tracing::warn!(outer, inner, total, "ball ratio hit the point cap");
            break;
        }
    }
    let total = hits.len();
    let count = hits.iter().filter(|&&h| h > 0.0).count();
    if count == 0 {
        return Err(PolyError::numerical(format!(
            "no sample of P ∩ B({outer:.3e}) fell inside B({inner:.3e})"
        )));
    }
    let ratio = count as f64 / total as f64;
    tracing::debug!(outer, inner, ratio, points = total, "ball ratio");
    Ok(ratio)
}

/// `ln vol(P)` from a decreasing radius chain `radii[0] > ... > radii[k] = r0`.
pub(super) fn telescope<R: Rng + ?Sized>(ctx: &Ctx<'_>, radii: &[f64], rng: &mut R) -> Result<f64> {
    let m = radii.len().saturating_sub(1);
    let tol = ctx.ratio_tolerance(m);
    let mut log_vol = log_ball_volume(ctx.dim(), ctx.r0);
    for pair in radii.windows(2) {
        log_vol -= ball_ratio(ctx, pair[0], pair[1], tol, rng)?.ln();
    }
    Ok(log_vol)
}

/// Radii `r0 * 2^{i/n}`, `i = 0..k`, capped by the enclosing radius; returned largest first.
pub(super) fn doubling_radii(n: usize, r0: f64, r_max: f64) -> Vec<f64> {
    let k = if r_max > r0 {
        (n as f64 * (r_max / r0).log2()).ceil() as usize
    } else {
        0
    };
    let mut radii: Vec<f64> = (0..k)
        .map(|i| r0 * 2f64.powf(i as f64 / n as f64))
        .collect();
    radii.push(r_max.max(r0));
    if k == 0 {
        radii.clear();
        radii.push(r0);
    }
    radii.reverse();
    radii
}

pub(super) fn sequence_of_balls<R: Rng + ?Sized>(ctx: &Ctx<'_>, rng: &mut R) -> Result<f64> {
    let r_max = enclosing_radius(ctx, rng)?;
    let radii = doubling_radii(ctx.dim(), ctx.r0, r_max);
    tracing::debug!(phases = radii.len() - 1, r0 = ctx.r0, r_max, "sequence of balls");
    telescope(ctx, &radii, rng)
}
