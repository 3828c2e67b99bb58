//! Barrier-based Metropolis walks (Dikin, Vaidya, John).
//!
//! Proposal: `y ~ N(x, c * H(x)^{-1})` with the local Hessian
//!   H(x) = A^T S^{-1} diag(w(x)) S^{-1} A,   S = diag(b - A x),
//! and the Metropolis filter for a position-dependent Gaussian:
//!   log alpha = (log det H(y) - log det H(x)) / 2 - (|y - x|^2_{H(y)} - |y - x|^2_{H(x)}) / (2c).
//!
//! | barrier | weights `w`                         | scale `c`           |
//! |---------|-------------------------------------|---------------------|
//! | Dikin   | `1`                                 | `r^2 / d`           |
//! | Vaidya  | leverage scores of `S^{-1}A` + `d/m` | `r^2 / sqrt(m d)`   |
//! | John    | John weights of `S^{-1}A` + `d/(2m)` | `r^2 / d^{3/2}`     |
//!
//! References
//! - Kannan, Narayanan (2012), "Random walks on polytopes and an affine interior point method".
//! - Chen, Dwivedi, Wainwright, Yu (2018), "Fast MCMC sampling algorithms on polytopes".

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{PolyError, Result};
use crate::linalg::{cholesky, john_weights, leverage_scores, log_det_from_cholesky, scaled_rows, weighted_gram};
use crate::polytope::HPolytope;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Barrier {
    Dikin,
    Vaidya,
    John,
}

#[derive(Clone, Copy, Debug)]
pub struct BarrierWalk {
    pub barrier: Barrier,
    /// Radius of the local (Dikin-type) ellipsoid.
    pub r: f64,
}

impl BarrierWalk {
    pub fn new(barrier: Barrier) -> Self {
        Self { barrier, r: 0.9 }
    }

    fn scale(&self, m: usize, d: usize) -> f64 {
        let (m, d) = (m as f64, d as f64);
        let r2 = self.r * self.r;
        match self.barrier {
            Barrier::Dikin => r2 / d,
            Barrier::Vaidya => r2 / (m * d).sqrt(),
            Barrier::John => r2 / d.powf(1.5),
        }
    }

    /// Local Hessian `H(x)`; `x` must be strictly interior.
    pub fn hessian(&self, poly: &HPolytope, x: &DVector<f64>) -> Result<DMatrix<f64>> {
        let (as_, _) = scaled_rows(poly, x)?;
        let (m, d) = as_.shape();
        let w = match self.barrier {
            Barrier::Dikin => DVector::from_element(m, 1.0),
            Barrier::Vaidya => leverage_scores(&as_)?.add_scalar(d as f64 / m as f64),
            Barrier::John => john_weights(&as_, 1e-12, 30, 1e-8)?.add_scalar(d as f64 / (2.0 * m as f64)),
        };
        Ok(weighted_gram(&as_, &w))
    }

    pub fn step<R: Rng + ?Sized>(&self, poly: &HPolytope, x: &mut DVector<f64>, rng: &mut R) -> Result<()> {
        let d = poly.dimension();
        let c = self.scale(poly.num_facets(), d);
        let hx = self.hessian(poly, x)?;
        let chx = cholesky(&hx)?;
        let z = DVector::from_fn(d, |_, _| rng.sample::<f64, _>(StandardNormal));
        let w = chx
            .l_dirty()
            .tr_solve_lower_triangular(&z)
            .ok_or_else(|| PolyError::numerical("barrier proposal solve failed"))?;
        let y = &*x + w * c.sqrt();
        if !poly.is_interior(&y) {
            return Ok(());
        }
        // Near-boundary proposals whose Hessian cannot be factored are rejected.
        let Ok(hy) = self.hessian(poly, &y) else {
            return Ok(());
        };
        let Ok(chy) = cholesky(&hy) else {
            return Ok(());
        };
        let diff = &y - &*x;
        let qx = diff.dot(&(&hx * &diff));
        let qy = diff.dot(&(&hy * &diff));
        let log_alpha =
            0.5 * (log_det_from_cholesky(&chy) - log_det_from_cholesky(&chx)) - (qy - qx) / (2.0 * c);
        if log_alpha >= 0.0 || rng.gen::<f64>().ln() < log_alpha {
            *x = y;
        }
        Ok(())
    }
}
