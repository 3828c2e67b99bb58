//! H-polytope `{x : A x <= b}` with cached row norms.

use nalgebra::{DMatrix, DVector};

use super::body::ConvexBody;
use super::cfg::{FEAS_EPS, MIN_NORM, PARALLEL_EPS};
use crate::error::{PolyError, Result};

/// Immutable H-representation.
///
/// Invariants:
/// - `a` is `m x n`, `b` has length `m`, `n >= 1`, all entries finite.
/// - `row_norms[i] = ||a_i||` (rows are not normalized).
/// - Boundedness and a non-empty interior are the caller's responsibility.
#[derive(Clone, Debug, PartialEq)]
pub struct HPolytope {
    a: DMatrix<f64>,
    b: DVector<f64>,
    row_norms: DVector<f64>,
}

impl HPolytope {
    pub fn new(a: DMatrix<f64>, b: DVector<f64>) -> Result<Self> {
        if a.nrows() != b.len() {
            return Err(PolyError::mismatch("rows of A vs length of b", a.nrows(), b.len()));
        }
        if a.ncols() == 0 {
            return Err(PolyError::degenerate("polytope needs at least one variable"));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(PolyError::numerical("A and b must be finite"));
        }
        Ok(Self::from_trusted(a, b))
    }

    /// Skip validation; callers guarantee matching shapes and finite entries.
    pub(crate) fn from_trusted(a: DMatrix<f64>, b: DVector<f64>) -> Self {
        let row_norms = DVector::from_fn(a.nrows(), |i, _| a.row(i).norm());
        Self { a, b, row_norms }
    }

    /// Build from row-major nested vectors (bindings, CLI).
    pub fn from_rows(rows: &[Vec<f64>], b: &[f64]) -> Result<Self> {
        let n = rows.first().map(|r| r.len()).unwrap_or(0);
        for r in rows {
            if r.len() != n {
                return Err(PolyError::mismatch("row length of A", n, r.len()));
            }
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let a = DMatrix::from_row_slice(rows.len(), n, &flat);
        Self::new(a, DVector::from_column_slice(b))
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.a.ncols()
    }
    #[inline]
    pub fn num_facets(&self) -> usize {
        self.a.nrows()
    }
    #[inline]
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }
    #[inline]
    pub fn b(&self) -> &DVector<f64> {
        &self.b
    }
    #[inline]
    pub fn row_norms(&self) -> &DVector<f64> {
        &self.row_norms
    }

    pub fn into_matrices(self) -> (DMatrix<f64>, DVector<f64>) {
        (self.a, self.b)
    }

    /// `b - A x`.
    pub fn slacks(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.b - &self.a * x
    }

    pub fn contains_eps(&self, x: &DVector<f64>, eps: f64) -> bool {
        x.len() == self.dimension() && self.slacks(x).iter().all(|&s| s >= -eps)
    }

    /// Strictly positive slack on every facet.
    pub fn is_interior(&self, x: &DVector<f64>) -> bool {
        x.len() == self.dimension() && self.slacks(x).iter().all(|&s| s > 0.0)
    }

    /// Radius of the largest ball centred at `x` that stays inside (negative if `x` is outside).
    pub fn facet_distance(&self, x: &DVector<f64>) -> f64 {
        let s = self.slacks(x);
        s.iter()
            .zip(self.row_norms.iter())
            .filter(|(_, &nrm)| nrm > MIN_NORM)
            .map(|(&si, &nrm)| si / nrm)
            .fold(f64::INFINITY, f64::min)
    }

    /// Pull back under `x = T y + shift`: returns `{y : A T y <= b - A shift}`.
    pub fn linear_transform(&self, t: &DMatrix<f64>, shift: &DVector<f64>) -> Result<Self> {
        let n = self.dimension();
        if t.nrows() != n || t.ncols() != n {
            return Err(PolyError::mismatch("transform size", n, t.nrows().max(t.ncols())));
        }
        if shift.len() != n {
            return Err(PolyError::mismatch("shift length", n, shift.len()));
        }
        Self::new(&self.a * t, &self.b - &self.a * shift)
    }

    /// Translate so that `c` becomes the origin.
    pub fn shifted(&self, c: &DVector<f64>) -> Result<Self> {
        let n = self.dimension();
        self.linear_transform(&DMatrix::identity(n, n), c)
    }

    /// Same polytope with unit-norm rows (zero rows are kept as-is).
    pub fn normalized(&self) -> Self {
        let mut a = self.a.clone();
        let mut b = self.b.clone();
        for i in 0..a.nrows() {
            let nrm = self.row_norms[i];
            if nrm > MIN_NORM {
                let mut row = a.row_mut(i);
                row /= nrm;
                b[i] /= nrm;
            }
        }
        Self::from_trusted(a, b)
    }
}

impl ConvexBody for HPolytope {
    fn dimension(&self) -> usize {
        self.a.ncols()
    }

    fn contains(&self, x: &DVector<f64>) -> bool {
        self.contains_eps(x, FEAS_EPS)
    }

    fn line_intersect(&self, x: &DVector<f64>, v: &DVector<f64>) -> (f64, f64) {
        let s = self.slacks(x);
        let av = &self.a * v;
        let mut lo = f64::NEG_INFINITY;
        let mut hi = f64::INFINITY;
        for (si, avi) in s.iter().zip(av.iter()) {
            if *avi > PARALLEL_EPS {
                hi = hi.min(si.max(0.0) / avi);
            } else if *avi < -PARALLEL_EPS {
                lo = lo.max(si.max(0.0) / avi);
            }
        }
        (lo, hi)
    }

    fn coordinate_intersect(&self, x: &DVector<f64>, coord: usize) -> (f64, f64) {
        let s = self.slacks(x);
        let col = self.a.column(coord);
        let mut lo = f64::NEG_INFINITY;
        let mut hi = f64::INFINITY;
        for (si, ai) in s.iter().zip(col.iter()) {
            if *ai > PARALLEL_EPS {
                hi = hi.min(si.max(0.0) / ai);
            } else if *ai < -PARALLEL_EPS {
                lo = lo.max(si.max(0.0) / ai);
            }
        }
        (lo, hi)
    }

    fn boundary_hit(&self, x: &DVector<f64>, v: &DVector<f64>) -> Option<(f64, DVector<f64>)> {
        let s = self.slacks(x);
        let av = &self.a * v;
        let mut best: Option<(f64, usize)> = None;
        for i in 0..s.len() {
            if av[i] > PARALLEL_EPS {
                let t = s[i].max(0.0) / av[i];
                if best.map_or(true, |(bt, _)| t < bt) {
                    best = Some((t, i));
                }
            }
        }
        best.map(|(t, i)| {
            let normal = self.a.row(i).transpose() / self.row_norms[i];
            (t, normal)
        })
    }
}
