//! PyO3 bindings for `polyvol`.
//!
//! Notes
//! - Matrices cross the boundary as row-major nested lists; sample sets are
//!   returned `d x N` (one inner list per coordinate).
//! - Method names go through `polyvol::api`, so unknown names raise `ValueError`
//!   before any sampling.

mod common;

use common::{map_poly_err, matrix_from_py, polytope_from_py, rows, vec};
use nalgebra::DVector;
use polyvol::api;
use polyvol::prelude::{LowDimHPolytope, MmcsOutput};
use pyo3::prelude::*;

type Matrix = Vec<Vec<f64>>;

#[pyfunction]
#[pyo3(signature = (a, b, volume_method="cooling_balls", walk_method="CDHR", walk_len=1, epsilon=0.1, seed=None, fast_mode=true))]
#[allow(clippy::too_many_arguments)]
fn compute_volume(
    a: Matrix,
    b: Vec<f64>,
    volume_method: &str,
    walk_method: &str,
    walk_len: usize,
    epsilon: f64,
    seed: Option<u64>,
    fast_mode: bool,
) -> PyResult<f64> {
    let poly = polytope_from_py(a, b)?;
    api::compute_volume(&poly, volume_method, walk_method, walk_len, epsilon, seed, fast_mode).map_err(map_poly_err)
}

#[pyfunction]
#[pyo3(signature = (a, b, method="billiard_walk", number_of_points=1000, number_of_points_to_burn=0, walk_len=1, fast_mode=true, seed=None))]
#[allow(clippy::too_many_arguments)]
fn generate_samples(
    a: Matrix,
    b: Vec<f64>,
    method: &str,
    number_of_points: usize,
    number_of_points_to_burn: usize,
    walk_len: usize,
    fast_mode: bool,
    seed: Option<u64>,
) -> PyResult<Matrix> {
    let poly = polytope_from_py(a, b)?;
    let s = api::generate_samples(&poly, method, number_of_points, number_of_points_to_burn, walk_len, fast_mode, seed)
        .map_err(map_poly_err)?;
    Ok(rows(&s))
}

/// Returns `(A, b, T, shift, round_value)`.
#[pyfunction]
#[pyo3(signature = (a, b, method="isotropic_position", fast_mode=true, seed=None))]
fn rounding(
    a: Matrix,
    b: Vec<f64>,
    method: &str,
    fast_mode: bool,
    seed: Option<u64>,
) -> PyResult<(Matrix, Vec<f64>, Matrix, Vec<f64>, f64)> {
    let poly = polytope_from_py(a, b)?;
    let r = api::rounding(&poly, method, fast_mode, seed).map_err(map_poly_err)?;
    Ok((
        rows(r.polytope.a()),
        vec(r.polytope.b()),
        rows(&r.transform),
        vec(&r.shift),
        r.round_value,
    ))
}

type MmcsTuple = (Matrix, Vec<f64>, Matrix, Vec<f64>, Matrix, String, Option<String>);

/// A failed run still hands back the samples of its completed phases; the
/// status tag and error message tell the caller how the run ended.
fn mmcs_tuple(out: MmcsOutput) -> MmcsTuple {
    (
        rows(&out.a),
        vec(&out.b),
        rows(&out.transform),
        vec(&out.shift),
        rows(&out.samples),
        out.outcome.as_str().to_string(),
        out.outcome.error().map(ToString::to_string),
    )
}

/// Returns `(A, b, T, shift, samples, status, error)` with samples in original
/// coordinates; `status` is `converged`, `phase_cap` or `failed`.
#[pyfunction]
#[pyo3(signature = (a, b, ess=1000, psrf_check=true, parallelism=false, num_threads=1, seed=None))]
#[allow(clippy::too_many_arguments)]
fn fast_mmcs(
    a: Matrix,
    b: Vec<f64>,
    ess: usize,
    psrf_check: bool,
    parallelism: bool,
    num_threads: usize,
    seed: Option<u64>,
) -> PyResult<MmcsTuple> {
    let poly = polytope_from_py(a, b)?;
    let out = api::fast_mmcs(&poly, ess, psrf_check, parallelism, num_threads, seed).map_err(map_poly_err)?;
    Ok(mmcs_tuple(out))
}

#[pyfunction]
#[pyo3(signature = (a, b, ess=1000, psrf_check=true, parallelism=false, num_threads=1, seed=None))]
#[allow(clippy::too_many_arguments)]
fn slow_mmcs(
    a: Matrix,
    b: Vec<f64>,
    ess: usize,
    psrf_check: bool,
    parallelism: bool,
    num_threads: usize,
    seed: Option<u64>,
) -> PyResult<MmcsTuple> {
    let poly = polytope_from_py(a, b)?;
    let out = api::slow_mmcs(&poly, ess, psrf_check, parallelism, num_threads, seed).map_err(map_poly_err)?;
    Ok(mmcs_tuple(out))
}

/// Returns `(A, b, N, shift)` of the reduced system; lift with `x = N y + shift`.
#[pyfunction]
fn full_dimensional_polytope(
    a: Matrix,
    b: Vec<f64>,
    aeq: Matrix,
    beq: Vec<f64>,
) -> PyResult<(Matrix, Vec<f64>, Matrix, Vec<f64>)> {
    let low = LowDimHPolytope::new(
        matrix_from_py(&a)?,
        DVector::from_vec(b),
        matrix_from_py(&aeq)?,
        DVector::from_vec(beq),
    )
    .map_err(map_poly_err)?;
    let proj = low.full_dimensional_polytope().map_err(map_poly_err)?;
    Ok((
        rows(proj.polytope.a()),
        vec(proj.polytope.b()),
        rows(&proj.n_extra_trans),
        vec(&proj.shift),
    ))
}

#[pymodule]
fn polyvol_native(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add("__version__", polyvol::VERSION)?;
    m.add_function(wrap_pyfunction!(compute_volume, m)?)?;
    m.add_function(wrap_pyfunction!(generate_samples, m)?)?;
    m.add_function(wrap_pyfunction!(rounding, m)?)?;
    m.add_function(wrap_pyfunction!(fast_mmcs, m)?)?;
    m.add_function(wrap_pyfunction!(slow_mmcs, m)?)?;
    m.add_function(wrap_pyfunction!(full_dimensional_polytope, m)?)?;
    Ok(())
}
