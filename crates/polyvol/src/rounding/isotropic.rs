//! Isotropic step: whiten by the sample covariance, `x = L y + mean`, `L L^T = Cov`.

use nalgebra::{DMatrix, DVector};

use crate::error::{PolyError, Result};
use crate::linalg::{cholesky_lower, symmetrize};
use crate::stats::mean_and_covariance;

pub(crate) fn step(samples: &DMatrix<f64>) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let d = samples.nrows();
    if samples.ncols() <= d {
        return Err(PolyError::invalid(
            "points",
            format!("covariance in dimension {d} needs more than {d} points"),
        ));
    }
    let (mean, mut cov) = mean_and_covariance(samples);
    symmetrize(&mut cov);
    Ok((cholesky_lower(&cov)?, mean))
}
