//! Large inscribed ellipsoid from John weights at the analytic centre.
//!
//! - `x_c`: analytic centre (affine invariant, so one pass suffices).
//! - `M = A^T S^{-1} W S^{-1} A` with John weights `w` of `S^{-1} A`.
//! - `h = max_i m_i^T M^{-1} m_i` (`m_i` the rows of `S^{-1} A`); the ellipsoid
//!   `{x_c + u : u^T (h M) u <= 1}` touches at least one facet and lies inside.
//! - Step: `L = chol((h M)^{-1})`, shift `x_c`.

use nalgebra::{DMatrix, DVector};

use crate::error::Result;
use crate::linalg::{analytic_center, cholesky, cholesky_lower, john_weights, scaled_rows, symmetrize, weighted_gram};
use crate::polytope::HPolytope;

pub(crate) fn step(
    poly: &HPolytope,
    start: &DVector<f64>,
    newton_iter: usize,
    john_iter: usize,
) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let xc = analytic_center(poly, start, newton_iter)?;
    let (m_rows, _) = scaled_rows(poly, &xc)?;
    let w = john_weights(&m_rows, 0.0, john_iter, 1e-10)?;
    let m = weighted_gram(&m_rows, &w);
    let ch = cholesky(&m)?;
    let h = m_rows
        .row_iter()
        .map(|r| {
            let rt = r.transpose();
            rt.dot(&ch.solve(&rt))
        })
        .fold(0.0, f64::max);
    let mut shape = ch.inverse() / h;
    symmetrize(&mut shape);
    tracing::trace!(h, "john ellipsoid scale");
    Ok((cholesky_lower(&shape)?, xc))
}
