//! Benchmarks for stockcast-model estimation and search.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::Rng;
use stockcast_model::{AutoArima, AutoArimaConfig, SarimaConfig, SarimaEstimator, SarimaSpec};
use stockcast_primitives::{ArimaOrder, SeasonalOrder};
use stockcast_traits::{Forecaster, ModelEstimator};

fn random_walk(n: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    let mut level = 100.0;
    (0..n)
        .map(|_| {
            level += rng.r#gen::<f64>() - 0.5;
            level
        })
        .collect()
}

fn bench_sarima_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("sarima_fit");
    group.sample_size(20);

    let specs = [
        ("arima_110", SarimaSpec::non_seasonal(ArimaOrder::new(1, 1, 0), true)),
        ("arima_212", SarimaSpec::non_seasonal(ArimaOrder::new(2, 1, 2), true)),
        (
            "sarima_011_011_5",
            SarimaSpec::new(ArimaOrder::new(0, 1, 1), SeasonalOrder::new(0, 1, 1, 5), false),
        ),
    ];

    for n in [252, 1260] {
        let series = random_walk(n);
        group.throughput(Throughput::Elements(n as u64));
        for (name, spec) in specs {
            group.bench_with_input(BenchmarkId::new(name, n), &series, |b, series| {
                let estimator = SarimaEstimator::with_config(SarimaConfig::for_spec(spec));
                b.iter(|| estimator.fit(black_box(series)).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let series = random_walk(1260);
    let spec = SarimaSpec::non_seasonal(ArimaOrder::new(2, 1, 1), true);
    let fit = SarimaEstimator::with_config(SarimaConfig::for_spec(spec)).fit(&series).unwrap();

    c.bench_function("forecast_60_steps", |b| {
        b.iter(|| fit.forecast(black_box(60), 0.05).unwrap());
    });
}

fn bench_auto_arima(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_arima");
    group.sample_size(10);

    let series = random_walk(504);
    for stepwise in [true, false] {
        let config = AutoArimaConfig { stepwise, max_p: 3, max_q: 3, ..Default::default() };
        let search = AutoArima::with_config(config);
        let name = if stepwise { "stepwise" } else { "grid" };
        group.bench_function(name, |b| {
            b.iter(|| search.search(black_box(&series)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sarima_fit, bench_forecast, bench_auto_arima);
criterion_main!(benches);
