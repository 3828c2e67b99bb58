//! Print volume estimates for a few bodies with closed-form volumes.
//!
//! Usage:
//!   cargo run -p polyvol --release --example volume_table -- [epsilon]

use polyvol::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn main() {
    let eps: f64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.1);
    let bodies = [
        ("unit_cube(5)", special::unit_cube(5), 1.0),
        ("simplex(5)", special::simplex(5), 1.0 / special::factorial(5)),
        ("cross_polytope(4)", special::cross_polytope(4), 16.0 / special::factorial(4)),
    ];
    let methods = [
        (VolumeMethod::SequenceOfBalls, VolumeWalk::Cdhr),
        (VolumeMethod::CoolingBalls, VolumeWalk::Billiard),
        (VolumeMethod::CoolingGaussian, VolumeWalk::GaussianCdhr),
    ];
    println!("{:<20} {:<18} {:>12} {:>12} {:>8}", "body", "method", "estimate", "exact", "rel.err");
    for (name, poly, exact) in &bodies {
        let ball = match InnerBallKind::Fast.inner_ball(poly) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("{name}: {e}");
                continue;
            }
        };
        for (i, (method, walk)) in methods.iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(100 + i as u64);
            match compute_volume(poly, *method, *walk, 1, eps, &ball, &VolumeCfg::default(), &mut rng) {
                Ok(v) => println!(
                    "{name:<20} {:<18} {v:>12.5e} {exact:>12.5e} {:>8.3}",
                    method.as_str(),
                    (v - exact).abs() / exact
                ),
                Err(e) => eprintln!("{name} / {method}: {e}"),
            }
        }
    }
}
