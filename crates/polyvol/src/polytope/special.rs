//! Special H-polytopes used in tests, benchmarks and demos.
//!
//! Volume formulas
//! - Cube `[-a,a]^n`: `(2a)^n`; unit cube `[0,1]^n`: 1.
//! - Corner simplex `{x >= 0, sum x <= 1}`: `1/n!`.
//! - Cross polytope `{||x||_1 <= 1}`: `2^n/n!`.
//!
//! Inputs are trusted: non-finite half-widths produce an invalid polytope.

use nalgebra::{DMatrix, DVector};

use super::types::HPolytope;

/// Axis-aligned cube `[-half, half]^n`; volume `(2 half)^n`.
pub fn cube(n: usize, half: f64) -> HPolytope {
    boxed(&vec![half; n])
}

/// Unit cube `[0, 1]^n`; volume 1.
pub fn unit_cube(n: usize) -> HPolytope {
    let mut a = DMatrix::zeros(2 * n, n);
    let mut b = DVector::zeros(2 * n);
    for i in 0..n {
        a[(2 * i, i)] = 1.0;
        b[2 * i] = 1.0;
        a[(2 * i + 1, i)] = -1.0;
    }
    HPolytope::from_trusted(a, b)
}

/// Centered box with half-widths `halves`; volume `prod(2 h_i)`.
pub fn boxed(halves: &[f64]) -> HPolytope {
    let n = halves.len();
    let mut a = DMatrix::zeros(2 * n, n);
    let mut b = DVector::zeros(2 * n);
    for (i, &h) in halves.iter().enumerate() {
        a[(2 * i, i)] = 1.0;
        a[(2 * i + 1, i)] = -1.0;
        b[2 * i] = h;
        b[2 * i + 1] = h;
    }
    HPolytope::from_trusted(a, b)
}

/// Corner simplex `{x >= 0, sum x <= 1}`; volume `1/n!`.
pub fn simplex(n: usize) -> HPolytope {
    let mut a = DMatrix::zeros(n + 1, n);
    let mut b = DVector::zeros(n + 1);
    for i in 0..n {
        a[(i, i)] = -1.0;
        a[(n, i)] = 1.0;
    }
    b[n] = 1.0;
    HPolytope::from_trusted(a, b)
}

/// Cross polytope `{||x||_1 <= 1}` (2^n facets); volume `2^n / n!`.
pub fn cross_polytope(n: usize) -> HPolytope {
    let m = 1usize << n;
    let mut a = DMatrix::zeros(m, n);
    for k in 0..m {
        for i in 0..n {
            a[(k, i)] = if (k >> i) & 1 == 1 { -1.0 } else { 1.0 };
        }
    }
    HPolytope::from_trusted(a, DVector::from_element(m, 1.0))
}

/// `n!` as a float (small `n` only).
pub fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}
