//! Low-dimensional polytopes `{x : A x <= b, Aeq x = beq}` and their
//! full-dimensional reparameterization.
//!
//! Construction
//! - `N`: orthonormal basis of `null(Aeq)`: right singular vectors of `Aeq`
//!   (zero-padded to square) whose singular values fall below
//!   `RANK_EPS * max(1, sigma_max)`.
//! - `x0`: least-squares solution of `Aeq x = beq` (SVD); must have a small residual.
//! - Reduced system: `{y : A N y <= b - A x0}`; rows that vanish on the subspace
//!   are dropped after checking they are satisfied by `x0`.
//! - Lifting: `x = N y + x0`.

use nalgebra::{DMatrix, DVector};

use super::cfg::{FEAS_EPS, MIN_NORM, RANK_EPS};
use super::types::HPolytope;
use crate::error::{PolyError, Result};

#[derive(Clone, Debug)]
pub struct LowDimHPolytope {
    a: DMatrix<f64>,
    b: DVector<f64>,
    aeq: DMatrix<f64>,
    beq: DVector<f64>,
}

/// Output of `LowDimHPolytope::full_dimensional_polytope`.
#[derive(Clone, Debug)]
pub struct FullDimProjection {
    pub polytope: HPolytope,
    /// `n x d` orthonormal basis of the equality subspace ("N_extra_trans").
    pub n_extra_trans: DMatrix<f64>,
    pub shift: DVector<f64>,
}

impl LowDimHPolytope {
    pub fn new(
        a: DMatrix<f64>,
        b: DVector<f64>,
        aeq: DMatrix<f64>,
        beq: DVector<f64>,
    ) -> Result<Self> {
        if a.nrows() != b.len() {
            return Err(PolyError::mismatch("rows of A vs length of b", a.nrows(), b.len()));
        }
        if aeq.nrows() != beq.len() {
            return Err(PolyError::mismatch(
                "rows of Aeq vs length of beq",
                aeq.nrows(),
                beq.len(),
            ));
        }
        if aeq.ncols() != a.ncols() {
            return Err(PolyError::mismatch("columns of Aeq vs columns of A", a.ncols(), aeq.ncols()));
        }
        Ok(Self { a, b, aeq, beq })
    }

    pub fn dimension(&self) -> usize {
        self.a.ncols()
    }

    pub fn equalities(&self) -> (&DMatrix<f64>, &DVector<f64>) {
        (&self.aeq, &self.beq)
    }

    pub fn inequalities(&self) -> (&DMatrix<f64>, &DVector<f64>) {
        (&self.a, &self.b)
    }

    pub fn full_dimensional_polytope(&self) -> Result<FullDimProjection> {
        let n = self.dimension();
        let basis = null_space(&self.aeq)?;
        if basis.ncols() == 0 {
            return Err(PolyError::degenerate(
                "equality system leaves a zero-dimensional null space",
            ));
        }

        let x0 = if self.aeq.nrows() == 0 {
            DVector::zeros(n)
        } else {
            let svd = self.aeq.clone().svd(true, true);
            let x0 = svd
                .solve(&self.beq, RANK_EPS)
                .map_err(|e| PolyError::numerical(format!("equality least squares: {e}")))?;
            let residual = (&self.aeq * &x0 - &self.beq).norm();
            if residual > 1e-8 * (1.0 + self.beq.norm()) {
                return Err(PolyError::degenerate(format!(
                    "equality system is inconsistent (residual {residual:.3e})"
                )));
            }
            x0
        };

        let a_red = &self.a * &basis;
        let b_red = &self.b - &self.a * &x0;
        let mut keep = Vec::with_capacity(a_red.nrows());
        for i in 0..a_red.nrows() {
            if a_red.row(i).norm() > MIN_NORM {
                keep.push(i);
            } else if b_red[i] < -FEAS_EPS {
                return Err(PolyError::degenerate(format!(
                    "inequality {i} is violated on the whole equality subspace"
                )));
            }
        }
        if keep.is_empty() {
            return Err(PolyError::degenerate(
                "no inequality constrains the equality subspace (unbounded)",
            ));
        }
        let a_keep = a_red.select_rows(keep.iter());
        let b_keep = b_red.select_rows(keep.iter());
        tracing::debug!(
            ambient = n,
            reduced = basis.ncols(),
            dropped = a_red.nrows() - keep.len(),
            "projected onto equality subspace"
        );
        Ok(FullDimProjection {
            polytope: HPolytope::new(a_keep, b_keep)?,
            n_extra_trans: basis,
            shift: x0,
        })
    }
}

impl FullDimProjection {
    /// `x = N y + x0`.
    pub fn lift(&self, y: &DVector<f64>) -> DVector<f64> {
        &self.n_extra_trans * y + &self.shift
    }

    /// Lift every column of a `d x N` sample matrix.
    pub fn lift_columns(&self, ys: &DMatrix<f64>) -> DMatrix<f64> {
        let mut out = &self.n_extra_trans * ys;
        for mut col in out.column_iter_mut() {
            col += &self.shift;
        }
        out
    }
}

/// Orthonormal basis (columns) of `null(m)`.
///
/// `m` is padded with zero rows to at least `n x n` so the SVD returns a full `V`.
fn null_space(m: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let n = m.ncols();
    if m.nrows() == 0 {
        return Ok(DMatrix::identity(n, n));
    }
    let mut padded = DMatrix::zeros(m.nrows().max(n), n);
    padded.rows_mut(0, m.nrows()).copy_from(m);
    let svd = padded.svd(false, true);
    let v_t = svd
        .v_t
        .ok_or_else(|| PolyError::numerical("SVD of Aeq returned no right singular vectors"))?;
    let sigma_max = svd.singular_values.iter().copied().fold(0.0, f64::max);
    let cutoff = RANK_EPS * sigma_max.max(1.0);
    let cols: Vec<DVector<f64>> = svd
        .singular_values
        .iter()
        .enumerate()
        .filter(|(_, &s)| s <= cutoff)
        .map(|(j, _)| v_t.row(j).transpose())
        .collect();
    Ok(if cols.is_empty() {
        DMatrix::zeros(n, 0)
    } else {
        DMatrix::from_columns(&cols)
    })
}
