//! Cooling balls: adaptive radii from sample-norm quantiles.
//!
//! Schedule: starting from the enclosing radius, sample `P ∩ B(r_i)`; if at
//! least `ball_stop_fraction` of the points lie in `B(r0)` the chain ends at
//! `r0`, otherwise `r_{i+1}` is the `ball_ratio_quantile` of the sample norms
//! (never below `r0`). The ratios are then re-estimated with fresh chains.

use rand::Rng;

use super::balls::{enclosing_radius, sample_norms, telescope};
use super::Ctx;
use crate::error::{PolyError, Result};

pub(super) fn cooling_balls<R: Rng + ?Sized>(ctx: &Ctx<'_>, rng: &mut R) -> Result<f64> {
    let radii = schedule(ctx, rng)?;
    tracing::debug!(phases = radii.len() - 1, r0 = ctx.r0, "cooling balls schedule");
    telescope(ctx, &radii, rng)
}

fn schedule<R: Rng + ?Sized>(ctx: &Ctx<'_>, rng: &mut R) -> Result<Vec<f64>> {
    let cfg = ctx.cfg;
    let mut radii = vec![enclosing_radius(ctx, rng)?];
    for _ in 0..cfg.max_phases {
        let current = radii[radii.len() - 1];
        if current <= ctx.r0 {
            return Ok(radii);
        }
        let mut norms = sample_norms(ctx, current, cfg.schedule_points, rng)?;
        let inside = norms.iter().filter(|&&r| r <= ctx.r0).count() as f64 / norms.len().max(1) as f64;
        if inside >= cfg.ball_stop_fraction {
            radii.push(ctx.r0);
            return Ok(radii);
        }
        norms.sort_by(f64::total_cmp);
        let idx = ((norms.len() as f64 * cfg.ball_ratio_quantile) as usize).min(norms.len() - 1);
        let next = norms[idx].max(ctx.r0);
        // Guard against a stalled schedule: insist on a visible shrink.
        radii.push(next.min(current * (1.0 - 1e-3)).max(ctx.r0));
    }
    Err(PolyError::numerical(format!(
        "cooling balls schedule exceeded {} phases",
        cfg.max_phases
    )))
}
