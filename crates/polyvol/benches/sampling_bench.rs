//! Criterion microbenches for the uniform kernels and one MMCS run.
//!
//! - Per walk: 200 recorded points on a 10D cube.
//! - MMCS: a 5D skewed box to `target_ess = 200`, sequential and on 2 threads.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polyvol::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn bench_walks(c: &mut Criterion) {
    let mut group = c.benchmark_group("walks");
    group.throughput(Throughput::Elements(200));
    let poly = special::cube(10, 1.0);
    let start = DVector::zeros(10);
    let params = SamplingParams {
        walk_len: 1,
        number_of_points: 200,
        number_of_points_to_burn: 0,
    };
    for walk in WalkType::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(walk), &walk, |b, &w| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(1);
                black_box(apply_sampling(&poly, w, &params, &start, 1.0, &mut rng).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_mmcs(c: &mut Criterion) {
    let mut group = c.benchmark_group("mmcs");
    group.sample_size(10);
    let poly = special::boxed(&[1.0, 0.1, 2.0, 0.5, 1.0]);
    for threads in [1usize, 2] {
        let settings = MmcsSettings {
            target_ess: 200,
            psrf_check: false,
            parallel: threads > 1,
            num_threads: threads,
            seed: Some(3),
            ..MmcsSettings::default()
        };
        group.bench_with_input(BenchmarkId::new("fast_mmcs", threads), &settings, |b, s| {
            b.iter(|| black_box(fast_mmcs(&poly, s).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_walks, bench_mmcs);
criterion_main!(benches);
