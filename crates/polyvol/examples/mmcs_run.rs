//! Run MMCS on a skewed box and report phases, ESS and PSRF.
//!
//! Usage:
//!   cargo run -p polyvol --release --example mmcs_run -- [target_ess]

use polyvol::prelude::*;

fn main() {
    let target: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);
    let poly = special::boxed(&[10.0, 1.0, 0.1, 1.0]);
    let settings = MmcsSettings {
        target_ess: target,
        seed: Some(2025),
        ..MmcsSettings::default()
    };
    match fast_mmcs(&poly, &settings) {
        Ok(out) => {
            println!(
                "outcome={:?} phases={} samples={} ess={:.1} psrf={:?}",
                out.outcome,
                out.phases,
                out.samples.ncols(),
                out.ess,
                out.psrf
            );
            let (mean, cov) = polyvol::stats::mean_and_covariance(&out.samples);
            println!("mean = {:.3}", mean.transpose());
            println!("variances = {:.3}", cov.diagonal().transpose());
        }
        Err(e) => eprintln!("mmcs failed: {e}"),
    }
}
