//! Chain diagnostics: effective sample size, split-chain PSRF, sample moments.
//!
//! Samples are stored column-wise (`d x N`): one column per point, in chain order.
//!
//! References
//! - Gelman, Rubin (1992), "Inference from iterative simulation using multiple sequences".
//! - Gelman et al. (2013), BDA3 ch. 11: ESS from the initial positive autocorrelation sequence.

use nalgebra::{DMatrix, DVector};

/// Autocorrelations `rho(1..=max_lag)` of a scalar chain (biased estimator).
pub fn autocorrelation(chain: &[f64], max_lag: usize) -> Vec<f64> {
    let n = chain.len();
    if n < 2 {
        return Vec::new();
    }
    let mean = chain.iter().sum::<f64>() / n as f64;
    let var = chain.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
    if var <= 0.0 {
        return vec![0.0; max_lag.min(n - 1)];
    }
    (1..=max_lag.min(n - 1))
        .map(|lag| {
            let c = chain
                .iter()
                .zip(chain.iter().skip(lag))
                .map(|(a, b)| (a - mean) * (b - mean))
                .sum::<f64>()
                / n as f64;
            c / var
        })
        .collect()
}

/// ESS of a set of equally long scalar chains: `N_total / (1 + 2 sum rho_k)` with the
/// lag-averaged autocorrelation summed until its first non-positive value.
/// Capped at `N_total`.
pub fn ess_chains(chains: &[Vec<f64>]) -> f64 {
    let n_keep = chains.iter().map(Vec::len).min().unwrap_or(0);
    let n_total: usize = chains.iter().map(Vec::len).sum();
    if n_keep < 10 {
        // Too short for a meaningful autocorrelation; treat as fully dependent.
        return if n_total == 0 { 0.0 } else { 1.0 };
    }
    let max_lag = (n_keep / 2).min(200);
    let mut avg = vec![0.0; max_lag];
    for chain in chains {
        for (i, ac) in autocorrelation(&chain[..n_keep], max_lag).into_iter().enumerate() {
            avg[i] += ac / chains.len() as f64;
        }
    }
    let sum: f64 = avg.iter().take_while(|&&ac| ac > 0.0).sum();
    (n_total as f64 / (1.0 + 2.0 * sum)).min(n_total as f64)
}

/// Single-chain ESS.
pub fn ess(chain: &[f64]) -> f64 {
    ess_chains(std::slice::from_ref(&chain.to_vec()))
}

/// Minimum over coordinates of the ESS of `chains` (each `d x N_c`, column per point).
pub fn min_ess(chains: &[DMatrix<f64>]) -> f64 {
    let Some(first) = chains.first() else {
        return 0.0;
    };
    (0..first.nrows())
        .map(|j| {
            let per_chain: Vec<Vec<f64>> = chains
                .iter()
                .map(|m| m.row(j).iter().copied().collect())
                .collect();
            ess_chains(&per_chain)
        })
        .fold(f64::INFINITY, f64::min)
}

/// Maximum over coordinates of the univariate split-chain potential scale reduction
/// factor, with the columns of `samples` cut into `chunks` consecutive segments.
/// Returns `None` when there are fewer than 4 points per segment.
pub fn psrf(samples: &DMatrix<f64>, chunks: usize) -> Option<f64> {
    let chunks = chunks.max(2);
    let len = samples.ncols() / chunks;
    if len < 4 {
        return None;
    }
    let mut worst: f64 = 0.0;
    for j in 0..samples.nrows() {
        let row = samples.row(j);
        let mut means = Vec::with_capacity(chunks);
        let mut vars = Vec::with_capacity(chunks);
        for c in 0..chunks {
            let seg: Vec<f64> = (c * len..(c + 1) * len).map(|k| row[k]).collect();
            let mean = seg.iter().sum::<f64>() / len as f64;
            let var = seg.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (len - 1) as f64;
            means.push(mean);
            vars.push(var);
        }
        let w = vars.iter().sum::<f64>() / chunks as f64;
        let grand = means.iter().sum::<f64>() / chunks as f64;
        let b = len as f64 * means.iter().map(|m| (m - grand).powi(2)).sum::<f64>()
            / (chunks - 1) as f64;
        let var_plus = ((len - 1) as f64 * w + b) / len as f64;
        let r = if w > 0.0 { (var_plus / w).sqrt() } else { f64::INFINITY };
        worst = worst.max(r);
    }
    Some(worst)
}

/// Sample mean and (unbiased) covariance of the columns of `samples`.
pub fn mean_and_covariance(samples: &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let n = samples.ncols();
    let d = samples.nrows();
    if n == 0 {
        return (DVector::zeros(d), DMatrix::zeros(d, d));
    }
    let mean = samples.column_mean();
    let mut centered = samples.clone();
    for mut col in centered.column_iter_mut() {
        col -= &mean;
    }
    let denom = (n.max(2) - 1) as f64;
    let cov = &centered * centered.transpose() / denom;
    (mean, cov)
}

/// Stack points as the columns of a `d x N` matrix.
pub fn columns(points: &[DVector<f64>]) -> DMatrix<f64> {
    match points.first() {
        Some(p) => DMatrix::from_fn(p.len(), points.len(), |i, j| points[j][i]),
        None => DMatrix::zeros(0, 0),
    }
}
