//! Inscribed ball without LP machinery.
//!
//! Maximizes the smoothed minimum of normalized slacks
//!   f_tau(x) = -tau ln sum_i exp(-s_i(x) / tau),   s_i(x) = (b_i - a_i·x) / ||a_i||,
//! by gradient ascent with Armijo backtracking, halving `tau` between rounds.
//! `f_tau <= min_i s_i`, and the gap is at most `tau ln m`, so the final radius
//! (the exact minimum slack at the iterate) is within `tau_min ln m` of the
//! Chebyshev radius once the ascent has converged.

use nalgebra::DVector;

use super::{validate, InnerBall, InnerBallSolver};
use crate::error::{PolyError, Result};
use crate::polytope::HPolytope;

#[derive(Clone, Copy, Debug)]
pub struct GeometricInnerBall {
    pub max_rounds: usize,
    pub max_steps: usize,
    /// Final temperature relative to the body's scale.
    pub tau_min_rel: f64,
    /// Iterates beyond this norm (relative to the scale) count as an unbounded body.
    pub escape_rel: f64,
}

impl Default for GeometricInnerBall {
    fn default() -> Self {
        Self {
            max_rounds: 40,
            max_steps: 400,
            tau_min_rel: 1e-7,
            escape_rel: 1e8,
        }
    }
}

impl InnerBallSolver for GeometricInnerBall {
    fn inner_ball(&self, poly: &HPolytope) -> Result<InnerBall> {
        let p = poly.normalized();
        let scale = 1.0 + p.b().amax();
        let mut x = DVector::zeros(p.dimension());
        let mut tau = scale;
        let tau_min = self.tau_min_rel * scale;
        // Step length carries over between iterations and may grow, so rays escape fast.
        let mut step = scale;
        for _ in 0..self.max_rounds {
            for _ in 0..self.max_steps {
                let (val, grad) = soft_min(&p, &x, tau);
                let gn = grad.norm();
                if gn < 1e-12 {
                    break;
                }
                let dir = grad / gn;
                step *= 2.0;
                let mut moved = false;
                while step > 1e-14 * scale {
                    let cand = &x + &dir * step;
                    if soft_min(&p, &cand, tau).0 >= val + 1e-4 * step * gn {
                        x = cand;
                        moved = true;
                        break;
                    }
                    step *= 0.5;
                }
                if !moved {
                    step = scale * tau;
                    break;
                }
                if x.norm() > self.escape_rel * scale {
                    return Err(PolyError::degenerate(
                        "polytope contains arbitrarily large balls",
                    ));
                }
            }
            if tau <= tau_min {
                break;
            }
            tau = (tau * 0.5).max(tau_min);
        }
        let radius = p.facet_distance(&x);
        tracing::trace!(radius, "geometric inner ball");
        validate(poly, InnerBall { center: x, radius })
    }

    fn name(&self) -> &'static str {
        "geometric"
    }
}

/// `(f_tau(x), grad f_tau(x))` for a row-normalized polytope.
fn soft_min(p: &HPolytope, x: &DVector<f64>, tau: f64) -> (f64, DVector<f64>) {
    let s = p.slacks(x);
    let smin = s.min();
    // Shifted log-sum-exp.
    let w = s.map(|si| (-(si - smin) / tau).exp());
    let z = w.sum();
    let val = smin - tau * z.ln();
    // d s_i / dx = -a_i; weights are the softmax of -s / tau.
    let grad = -(p.a().tr_mul(&(w / z)));
    (val, grad)
}
