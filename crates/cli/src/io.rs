//! CSV and JSON I/O for polytopes and sample matrices.
//!
//! Polytope CSV: one row per inequality, header `a0,...,a{n-1},b` (any names; the
//! column called `b` is the right-hand side, every other column belongs to `A`).
//! Sample CSV: one row per point, header `x0,...,x{d-1}`.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use nalgebra::{DMatrix, DVector};
use polars::prelude::*;
use serde::Serialize;

/// `(A, b)` from a polytope CSV.
pub fn read_system(path: &Path) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .finish()
        .and_then(|lf| lf.collect())
        .with_context(|| format!("reading {}", path.display()))?;
    let mut b = None;
    let mut cols = Vec::new();
    for s in df.get_columns() {
        let values = floats(s).with_context(|| format!("column `{}` of {}", s.name(), path.display()))?;
        if s.name().to_string() == "b" {
            b = Some(values);
        } else {
            cols.push(values);
        }
    }
    let b = b.ok_or_else(|| anyhow!("{} has no `b` column", path.display()))?;
    if cols.is_empty() {
        bail!("{} has no coefficient columns", path.display());
    }
    let m = b.len();
    let a = DMatrix::from_fn(m, cols.len(), |i, j| cols[j][i]);
    Ok((a, DVector::from_vec(b)))
}

fn floats(s: &Series) -> Result<Vec<f64>> {
    let s = s.cast(&DataType::Float64)?;
    s.f64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or_else(|| anyhow!("missing value in row {i}")))
        .collect()
}

/// Write the columns of `samples` (`d x N`) as CSV rows.
pub fn write_points(path: &Path, samples: &DMatrix<f64>) -> Result<()> {
    ensure_parent(path)?;
    let cols: Vec<Series> = samples
        .row_iter()
        .enumerate()
        .map(|(i, row)| Series::new(format!("x{i}").as_str().into(), row.iter().copied().collect::<Vec<f64>>()))
        .collect();
    let mut df = DataFrame::new(cols)?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("writing {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Row-major nested vectors, for JSON output.
pub fn rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter().map(|r| r.iter().copied().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dmatrix;
    use tempfile::tempdir;

    #[test]
    fn reads_a_square() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("square.csv");
        fs::write(&path, "a0,a1,b\n1,0,1\n-1,0,1\n0,1,1\n0,-1,1\n").unwrap();
        let (a, b) = read_system(&path).unwrap();
        assert_eq!(a, dmatrix![1.0, 0.0; -1.0, 0.0; 0.0, 1.0; 0.0, -1.0]);
        assert_eq!(b.as_slice(), &[1.0; 4]);
    }

    #[test]
    fn missing_rhs_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "a0,a1\n1,0\n").unwrap();
        let err = read_system(&path).unwrap_err();
        assert!(err.to_string().contains("no `b` column"));
    }

    #[test]
    fn points_are_written_one_per_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/points.csv");
        write_points(&path, &dmatrix![0.5, 1.5, 2.5; -1.0, 0.0, 1.0]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "x0,x1");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("0.5,"));
    }
}
