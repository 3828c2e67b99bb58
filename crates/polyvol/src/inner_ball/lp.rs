//! Chebyshev centre by a dense two-phase simplex.
//!
//! LP (variables `x = x⁺ - x⁻`, `r >= 0`):
//!   max r  s.t.  a_i·x⁺ - a_i·x⁻ + ||a_i|| r <= b_i.
//! Rows with `b_i < 0` are negated and receive an artificial variable; phase 1
//! drives the artificials to zero, phase 2 maximizes `r`. Bland's rule on both
//! phases, so the pivot sequence terminates without cycling.
//!
//! Code cross-refs: `super::validate`, `polytope::HPolytope::row_norms`.

use nalgebra::{DMatrix, DVector};

use super::{validate, InnerBall, InnerBallSolver};
use crate::error::{PolyError, Result};
use crate::polytope::cfg::RANK_EPS;
use crate::polytope::HPolytope;

/// LP-backed inscribed-ball supplier.
#[derive(Clone, Copy, Debug)]
pub struct LpInnerBall {
    pub pivot_tol: f64,
    /// Pivot cap as a multiple of `rows + cols`.
    pub max_pivots_factor: usize,
}

impl Default for LpInnerBall {
    fn default() -> Self {
        Self {
            pivot_tol: 1e-10,
            max_pivots_factor: 50,
        }
    }
}

impl InnerBallSolver for LpInnerBall {
    fn inner_ball(&self, poly: &HPolytope) -> Result<InnerBall> {
        let n = poly.dimension();
        let m = poly.num_facets();
        // Columns: x⁺ (n), x⁻ (n), r (1).
        let mut a = DMatrix::zeros(m, 2 * n + 1);
        for i in 0..m {
            for j in 0..n {
                a[(i, j)] = poly.a()[(i, j)];
                a[(i, n + j)] = -poly.a()[(i, j)];
            }
            a[(i, 2 * n)] = poly.row_norms()[i];
        }
        let mut c = DVector::zeros(2 * n + 1);
        c[2 * n] = 1.0;

        let z = match solve_max(&a, poly.b(), &c, *self)? {
            LpOutcome::Optimal(z) => z,
            LpOutcome::Infeasible => return Err(PolyError::degenerate("polytope is empty")),
            LpOutcome::Unbounded => {
                return Err(PolyError::degenerate(
                    "polytope contains arbitrarily large balls",
                ))
            }
        };
        let center = DVector::from_fn(n, |j, _| z[j] - z[n + j]);
        // Report the exact inscribed radius at the returned centre.
        let radius = poly.facet_distance(&center).min(z[2 * n]);
        validate(poly, InnerBall { center, radius })
    }

    fn name(&self) -> &'static str {
        "lp"
    }
}

/// Whether `poly` is bounded: `A` has full column rank and some `y >= 1` solves
/// `A^T y = 0`, so no nonzero `v` has `A v <= 0`.
pub(crate) fn is_bounded(poly: &HPolytope) -> Result<bool> {
    let a = poly.a();
    let (m, n) = a.shape();
    let scale = poly.row_norms().amax().max(1.0);
    if m <= n || a.rank(RANK_EPS * scale) < n {
        return Ok(false);
    }
    // y = 1 + z with z >= 0: A^T z = -A^T 1, as a pair of inequality blocks.
    let at = a.transpose();
    let rhs = -(&at * DVector::from_element(m, 1.0));
    let mut lhs = DMatrix::zeros(2 * n, m);
    lhs.rows_mut(0, n).copy_from(&at);
    lhs.rows_mut(n, n).copy_from(&(-&at));
    let mut b = DVector::zeros(2 * n);
    b.rows_mut(0, n).copy_from(&rhs);
    b.rows_mut(n, n).copy_from(&(-&rhs));
    let c = DVector::from_element(m, -1.0);
    Ok(matches!(
        solve_max(&lhs, &b, &c, LpInnerBall::default())?,
        LpOutcome::Optimal(_)
    ))
}

#[derive(Debug)]
enum LpOutcome {
    Optimal(DVector<f64>),
    Infeasible,
    Unbounded,
}

/// Tableau with basis bookkeeping; the last row is the objective, the last column the RHS.
struct Tableau {
    t: DMatrix<f64>,
    basis: Vec<usize>,
    tol: f64,
}

impl Tableau {
    fn rows(&self) -> usize {
        self.t.nrows() - 1
    }

    fn rhs(&self) -> usize {
        self.t.ncols() - 1
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let p = self.t[(row, col)];
        let mut r = self.t.row_mut(row);
        r /= p;
        let pivot_row = self.t.row(row).into_owned();
        for i in 0..self.t.nrows() {
            if i != row {
                let f = self.t[(i, col)];
                if f != 0.0 {
                    let mut r = self.t.row_mut(i);
                    r -= &pivot_row * f;
                }
            }
        }
        self.basis[row] = col;
    }

    /// Make the objective row consistent with the current basis.
    fn price_out(&mut self) {
        let obj = self.rows();
        for i in 0..self.rows() {
            let col = self.basis[i];
            let f = self.t[(obj, col)];
            if f != 0.0 {
                let row = self.t.row(i).into_owned();
                let mut r = self.t.row_mut(obj);
                r -= &row * f;
            }
        }
    }

    /// Bland's rule; `allowed` filters entering columns. Returns `false` on unboundedness.
    fn optimize(&mut self, allowed: impl Fn(usize) -> bool, max_pivots: usize) -> Result<bool> {
        let obj = self.rows();
        for _ in 0..max_pivots {
            let entering = (0..self.rhs()).find(|&j| allowed(j) && self.t[(obj, j)] < -self.tol);
            let Some(col) = entering else {
                return Ok(true);
            };
            let mut best: Option<(f64, usize)> = None;
            for i in 0..self.rows() {
                let aij = self.t[(i, col)];
                if aij > self.tol {
                    let ratio = self.t[(i, self.rhs())] / aij;
                    let better = match best {
                        None => true,
                        Some((r, bi)) => {
                            ratio < r - self.tol
                                || (ratio <= r + self.tol && self.basis[i] < self.basis[bi])
                        }
                    };
                    if better {
                        best = Some((ratio, i));
                    }
                }
            }
            match best {
                Some((_, row)) => self.pivot(row, col),
                None => return Ok(false),
            }
        }
        Err(PolyError::numerical("simplex pivot cap reached"))
    }
}

/// `max c·z  s.t.  A z <= b, z >= 0`.
fn solve_max(a: &DMatrix<f64>, b: &DVector<f64>, c: &DVector<f64>, cfg: LpInnerBall) -> Result<LpOutcome> {
    let (m, n) = a.shape();
    let negative: Vec<usize> = (0..m).filter(|&i| b[i] < 0.0).collect();
    let n_art = negative.len();
    // Columns: z (n), slacks (m), artificials (n_art), rhs.
    let cols = n + m + n_art;
    let mut t = DMatrix::zeros(m + 1, cols + 1);
    let mut basis = vec![0; m];
    let mut art_of_row = vec![None; m];
    for (k, &i) in negative.iter().enumerate() {
        art_of_row[i] = Some(n + m + k);
    }
    for i in 0..m {
        let sign = if b[i] < 0.0 { -1.0 } else { 1.0 };
        for j in 0..n {
            t[(i, j)] = sign * a[(i, j)];
        }
        t[(i, n + i)] = sign;
        t[(i, cols)] = sign * b[i];
        match art_of_row[i] {
            Some(col) => {
                t[(i, col)] = 1.0;
                basis[i] = col;
            }
            None => basis[i] = n + i,
        }
    }
    let max_pivots = cfg.max_pivots_factor * (m + cols);
    let mut tab = Tableau {
        t,
        basis,
        tol: cfg.pivot_tol,
    };

    if n_art > 0 {
        // Phase 1: max -sum(artificials).
        for k in 0..n_art {
            tab.t[(m, n + m + k)] = 1.0;
        }
        tab.price_out();
        tab.optimize(|_| true, max_pivots)?;
        if tab.t[(m, cols)] < -1e-8 * (1.0 + b.amax()) {
            return Ok(LpOutcome::Infeasible);
        }
        // Drive remaining zero-level artificials out of the basis where possible.
        for i in 0..m {
            if tab.basis[i] >= n + m {
                if let Some(col) = (0..n + m).find(|&j| tab.t[(i, j)].abs() > tab.tol) {
                    tab.pivot(i, col);
                }
            }
        }
    }

    // Phase 2.
    tab.t.row_mut(m).fill(0.0);
    for j in 0..n {
        tab.t[(m, j)] = -c[j];
    }
    tab.price_out();
    if !tab.optimize(|j| j < n + m, max_pivots)? {
        return Ok(LpOutcome::Unbounded);
    }
    let mut z = DVector::zeros(n);
    for i in 0..m {
        if tab.basis[i] < n {
            z[tab.basis[i]] = tab.t[(i, cols)];
        }
    }
    Ok(LpOutcome::Optimal(z))
}
