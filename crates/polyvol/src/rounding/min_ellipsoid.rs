//! Minimum-volume enclosing ellipsoid of a point cloud (Khachiyan's algorithm).
//!
//! Lifted points `q_j = (p_j, 1)`; weights `u` start uniform and move toward the
//! point of largest `q_j^T (Q U Q^T)^{-1} q_j`. At convergence the ellipsoid is
//!   {x : (x - c)^T E (x - c) <= 1},  c = P u,  E^{-1} = d (P U P^T - c c^T).
//!
//! References
//! - Khachiyan (1996); Todd, Yildirim (2007) "On Khachiyan's algorithm for MVEE".

use nalgebra::{DMatrix, DVector};

use crate::error::{PolyError, Result};
use crate::linalg::{cholesky, cholesky_lower, symmetrize, weighted_gram};

/// Centre `c` and `E^{-1}` of the MVEE of the columns of `points`.
pub(crate) fn mvee(points: &DMatrix<f64>, tol: f64, max_iter: usize) -> Result<(DVector<f64>, DMatrix<f64>)> {
    let (d, n) = points.shape();
    if n <= d {
        return Err(PolyError::invalid(
            "points",
            format!("MVEE needs more than {d} points in dimension {d}, got {n}"),
        ));
    }
    // Rows of `q` are the lifted points.
    let q = DMatrix::from_fn(n, d + 1, |j, i| if i < d { points[(i, j)] } else { 1.0 });
    let mut u = DVector::from_element(n, 1.0 / n as f64);
    for it in 0..max_iter {
        let x = weighted_gram(&q, &u);
        let ch = cholesky(&x)?;
        let mut qt = q.transpose();
        if !ch.l_dirty().solve_lower_triangular_mut(&mut qt) {
            return Err(PolyError::numerical("MVEE triangular solve failed"));
        }
        let (j, m) = qt
            .column_iter()
            .map(|c| c.norm_squared())
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |acc, (j, m)| if m > acc.1 { (j, m) } else { acc });
        let dd = (d + 1) as f64;
        let step = (m - dd) / (dd * (m - 1.0));
        let mut next = &u * (1.0 - step);
        next[j] += step;
        let change = (&next - &u).norm();
        u = next;
        if change < tol {
            tracing::trace!(iterations = it, "MVEE converged");
            break;
        }
    }
    let c = points * &u;
    let mut e_inv = weighted_gram(&points.transpose(), &u) - &c * c.transpose();
    e_inv *= d as f64;
    symmetrize(&mut e_inv);
    Ok((c, e_inv))
}

/// Rounding step from the MVEE of `samples`: `x = L y + c` maps the unit ball onto it.
pub(crate) fn step(samples: &DMatrix<f64>, tol: f64, max_iter: usize) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let (c, e_inv) = mvee(samples, tol, max_iter)?;
    Ok((cholesky_lower(&e_inv)?, c))
}
