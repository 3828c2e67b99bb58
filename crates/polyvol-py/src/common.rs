use nalgebra::{DMatrix, DVector};
use polyvol::prelude::{HPolytope, PolyError};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

/// Rows of `A` as nested lists plus `b`.
pub fn polytope_from_py(a: Vec<Vec<f64>>, b: Vec<f64>) -> PyResult<HPolytope> {
    HPolytope::from_rows(&a, &b).map_err(map_poly_err)
}

pub fn matrix_from_py(rows: &[Vec<f64>]) -> PyResult<DMatrix<f64>> {
    let n = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != n) {
        return Err(PyValueError::new_err("ragged matrix rows"));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(DMatrix::from_row_slice(rows.len(), n, &flat))
}

pub fn rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter().map(|r| r.iter().copied().collect()).collect()
}

pub fn vec(v: &DVector<f64>) -> Vec<f64> {
    v.iter().copied().collect()
}

/// Input problems become `ValueError`, numerical breakdown `RuntimeError`.
pub fn map_poly_err(err: PolyError) -> PyErr {
    match err {
        PolyError::NumericalFailure { .. } => PyRuntimeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}
