//! Criterion benchmarks for the volume estimators.
//!
//! Each method runs on a skewed 4D box with a fixed seed and `epsilon = 0.2`,
//! so the schedule length stays stable between runs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polyvol::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn bench_volume(c: &mut Criterion) {
    let mut group = c.benchmark_group("volume");
    group.sample_size(10);
    let poly = special::boxed(&[1.0, 0.5, 2.0, 1.0]);
    let ball = InnerBallKind::Fast.inner_ball(&poly).unwrap();
    let cases = [
        (VolumeMethod::SequenceOfBalls, VolumeWalk::Cdhr),
        (VolumeMethod::CoolingBalls, VolumeWalk::Billiard),
        (VolumeMethod::CoolingGaussian, VolumeWalk::GaussianCdhr),
    ];
    for (method, walk) in cases {
        group.bench_with_input(BenchmarkId::new(method.as_str(), walk.as_str()), &(method, walk), |b, &(m, w)| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(7);
                let v = compute_volume(&poly, m, w, 1, 0.2, &ball, &VolumeCfg::default(), &mut rng).unwrap();
                black_box(v)
            })
        });
    }
    group.finish();
}

fn bench_inner_ball(c: &mut Criterion) {
    let mut group = c.benchmark_group("inner_ball");
    for &n in &[4usize, 10, 20] {
        let poly = special::cross_polytope(n.min(8));
        let cube = special::cube(n, 1.0);
        group.bench_with_input(BenchmarkId::new("lp_cube", n), &cube, |b, p| {
            b.iter(|| black_box(InnerBallKind::Fast.inner_ball(p).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("geometric_cross", n.min(8)), &poly, |b, p| {
            b.iter(|| black_box(InnerBallKind::Slow.inner_ball(p).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_volume, bench_inner_ball);
criterion_main!(benches);
