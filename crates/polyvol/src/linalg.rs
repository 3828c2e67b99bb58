//! Dense linear-algebra helpers shared by walks, rounding and volume.
//!
//! Conventions
//! - `S = diag(b - A x)`; barrier quantities are evaluated at strictly interior `x`.
//! - Leverage scores of a tall matrix `M` are `diag(M (M^T M)^{-1} M^T)`; they sum to `rank(M)`.
//! - Failures to factor are reported as `NumericalFailure`, never panics.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn, SymmetricEigen};

use crate::error::{PolyError, Result};
use crate::polytope::HPolytope;

/// Lower Cholesky factor of a symmetric positive definite matrix.
pub fn cholesky_lower(m: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    Ok(cholesky(m)?.l())
}

pub(crate) fn cholesky(m: &DMatrix<f64>) -> Result<Cholesky<f64, Dyn>> {
    if m.iter().any(|v| !v.is_finite()) {
        return Err(PolyError::numerical("matrix has non-finite entries"));
    }
    Cholesky::new(m.clone()).ok_or_else(|| PolyError::numerical("matrix is not positive definite"))
}

/// `log det(M)` for SPD `M` via its Cholesky factor.
pub fn log_det_spd(m: &DMatrix<f64>) -> Result<f64> {
    let ch = cholesky(m)?;
    Ok(log_det_from_cholesky(&ch))
}

pub(crate) fn log_det_from_cholesky(ch: &Cholesky<f64, Dyn>) -> f64 {
    2.0 * ch.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>()
}

/// Symmetrize in place: `(M + M^T) / 2`.
pub(crate) fn symmetrize(m: &mut DMatrix<f64>) {
    let t = m.transpose();
    *m += t;
    *m *= 0.5;
}

/// `sqrt(lambda_max / lambda_min)` of a symmetric matrix; infinite if it is not positive definite.
pub fn sqrt_condition(m: &DMatrix<f64>) -> f64 {
    let eig = SymmetricEigen::new(m.clone());
    let (lo, hi) = eig
        .eigenvalues
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &l| {
            (lo.min(l), hi.max(l))
        });
    if lo <= 0.0 || !lo.is_finite() {
        f64::INFINITY
    } else {
        (hi / lo).sqrt()
    }
}

/// `A^T diag(w) A`.
pub(crate) fn weighted_gram(a: &DMatrix<f64>, w: &DVector<f64>) -> DMatrix<f64> {
    let mut scaled = a.clone();
    for (i, mut row) in scaled.row_iter_mut().enumerate() {
        row *= w[i];
    }
    a.tr_mul(&scaled)
}

/// Leverage scores of the rows of `m` (tall, full column rank).
pub fn leverage_scores(m: &DMatrix<f64>) -> Result<DVector<f64>> {
    let gram = m.tr_mul(m);
    let ch = cholesky(&gram)?;
    // Row i score: ||L^{-1} m_i||^2.
    let mt = whiten_rows(&ch, m)?;
    Ok(DVector::from_iterator(
        m.nrows(),
        mt.column_iter().map(|c| c.norm_squared()),
    ))
}

/// Columns `L^{-1} m_i` for the Cholesky factor `L` of `M^T W M`.
fn whiten_rows(ch: &Cholesky<f64, Dyn>, m: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let mut mt = m.transpose();
    if ch.l_dirty().solve_lower_triangular_mut(&mut mt) {
        Ok(mt)
    } else {
        Err(PolyError::numerical("triangular solve hit a zero pivot"))
    }
}

/// Slack-scaled constraint matrix `S^{-1} A` at `x`.
pub(crate) fn scaled_rows(poly: &HPolytope, x: &DVector<f64>) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let s = poly.slacks(x);
    if s.iter().any(|&si| si <= 0.0) {
        return Err(PolyError::numerical("barrier evaluated outside the interior"));
    }
    let mut as_ = poly.a().clone();
    for (i, mut row) in as_.row_iter_mut().enumerate() {
        row /= s[i];
    }
    Ok((as_, s))
}

/// John-ellipsoid weights of `{y : M y <= 1}` by the multiplicative fixed point
/// `w_i <- w_i * m_i^T (M^T W M)^{-1} m_i`, started at `d/m` and floored at `floor`.
pub fn john_weights(m: &DMatrix<f64>, floor: f64, max_iter: usize, tol: f64) -> Result<DVector<f64>> {
    let rows = m.nrows();
    let d = m.ncols();
    let mut w = DVector::from_element(rows, d as f64 / rows as f64);
    for _ in 0..max_iter {
        let gram = weighted_gram(m, &w);
        let ch = cholesky(&gram)?;
        let mt = whiten_rows(&ch, m)?;
        let next = DVector::from_iterator(
            rows,
            mt.column_iter()
                .zip(w.iter())
                .map(|(c, &wi)| (wi * c.norm_squared()).max(floor)),
        );
        let delta = (&next - &w).amax();
        w = next;
        if delta < tol {
            break;
        }
    }
    Ok(w)
}

/// Analytic center `argmin -sum ln(b - A x)` by damped Newton from an interior `start`.
pub fn analytic_center(poly: &HPolytope, start: &DVector<f64>, max_iter: usize) -> Result<DVector<f64>> {
    if !poly.is_interior(start) {
        return Err(PolyError::numerical("analytic center needs an interior start"));
    }
    let mut x = start.clone();
    for it in 0..max_iter {
        let (as_, _) = scaled_rows(poly, &x)?;
        let grad = as_.tr_mul(&DVector::from_element(as_.nrows(), 1.0));
        let hess = as_.tr_mul(&as_);
        let ch = cholesky(&hess)?;
        let step = ch.solve(&grad);
        // Newton decrement.
        let lambda2 = grad.dot(&step);
        if lambda2 < 1e-14 {
            tracing::trace!(iterations = it, "analytic center converged");
            break;
        }
        let phi = barrier_value(poly, &x);
        let mut t = 1.0;
        loop {
            let cand = &x - &step * t;
            if poly.is_interior(&cand) && barrier_value(poly, &cand) <= phi - 0.25 * t * lambda2 {
                x = cand;
                break;
            }
            t *= 0.5;
            if t < 1e-12 {
                return Ok(x);
            }
        }
    }
    Ok(x)
}

fn barrier_value(poly: &HPolytope, x: &DVector<f64>) -> f64 {
    -poly.slacks(x).iter().map(|s| s.ln()).sum::<f64>()
}

/// `ln vol(B_n(r))` via `V_n = 2 pi / n * V_{n-2}`, `V_0 = 1`, `V_1 = 2`.
pub fn log_ball_volume(n: usize, radius: f64) -> f64 {
    let mut lv = if n % 2 == 0 { 0.0 } else { 2f64.ln() };
    let mut k = if n % 2 == 0 { 2 } else { 3 };
    while k <= n {
        lv += (2.0 * std::f64::consts::PI / k as f64).ln();
        k += 2;
    }
    lv + n as f64 * radius.ln()
}

pub fn ball_volume(n: usize, radius: f64) -> f64 {
    log_ball_volume(n, radius).exp()
}
