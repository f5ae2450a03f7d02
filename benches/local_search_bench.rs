//! Criterion benchmarks for the local search steps.
//!
//! Random Euclidean instances with a shuffled starting tour, so every
//! measured sweep has real work to do.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use u_tour_opt::distance::CostMatrix;
use u_tour_opt::local_search::LocalSearch;

fn instance(n: usize, seed: u64) -> (CostMatrix, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.random_range(0.0..10_000.0), rng.random_range(0.0..10_000.0)))
        .collect();
    let mut tour: Vec<usize> = (0..n).collect();
    tour.shuffle(&mut rng);
    (CostMatrix::from_coordinates(&points), tour)
}

fn bench_two_opt_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("two_opt_step");
    let (dm, tour) = instance(400, 42);
    for threads in [1, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &t| {
            b.iter(|| {
                let mut ls = LocalSearch::new(&dm, true, &tour, t).expect("valid");
                black_box(ls.two_opt_step())
            })
        });
    }
    group.finish();
}

fn bench_asym_two_opt_step(c: &mut Criterion) {
    let (dm, tour) = instance(300, 7);
    c.bench_function("asym_two_opt_step_300", |b| {
        b.iter(|| {
            let mut ls = LocalSearch::new(&dm, false, &tour, 4).expect("valid");
            black_box(ls.asym_two_opt_step())
        })
    });
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    group.sample_size(10);
    for n in [100, 200] {
        let (dm, tour) = instance(n, 3);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut ls = LocalSearch::new(&dm, true, &tour, 4).expect("valid");
                black_box(ls.optimize())
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_two_opt_step,
    bench_asym_two_opt_step,
    bench_optimize
);
criterion_main!(benches);
