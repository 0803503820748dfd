//! Benchmarks for stockcast-stats operations.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use polars::prelude::*;
use rand::Rng;
use stockcast_stats::{RollingStats, VarMethod, adf_test, compute_var};
use stockcast_traits::TableTransform;

fn random_returns(n: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.r#gen::<f64>() * 0.04 - 0.02).collect()
}

fn bench_rolling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_stats");

    for size in [252, 2520, 25200] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let df = df! { "daily_return" => random_returns(size) }.unwrap();
            let transform = RollingStats::default();
            b.iter(|| transform.apply(black_box(&df)).unwrap());
        });
    }

    group.finish();
}

fn bench_var(c: &mut Criterion) {
    let returns = random_returns(2520);
    let mut group = c.benchmark_group("var");
    for method in [VarMethod::Historical, VarMethod::Parametric, VarMethod::monte_carlo()] {
        group.bench_function(method.to_string(), |b| {
            b.iter(|| compute_var(black_box(&returns), 0.05, method, 1).unwrap());
        });
    }
    group.finish();
}

fn bench_adf(c: &mut Criterion) {
    let mut level = 100.0;
    let prices: Vec<f64> = random_returns(1000)
        .into_iter()
        .map(|r| {
            level *= 1.0 + r;
            level
        })
        .collect();
    c.bench_function("adf_1000", |b| b.iter(|| adf_test(black_box(&prices), "bench").unwrap()));
}

criterion_group!(benches, bench_rolling, bench_var, bench_adf);
criterion_main!(benches);
