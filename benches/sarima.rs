//! Benchmarks for SARIMA fitting, forecasting and interval construction.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use follower_forecast::core::TimeSeries;
use follower_forecast::interval::confidence_intervals;
use follower_forecast::models::arima::SARIMA;
use follower_forecast::models::Forecaster;

fn generate_activity(days: usize) -> TimeSeries {
    let values = (0..days * 24)
        .map(|i| {
            let hour = (i % 24) as f64;
            200.0
                + 60.0 * (2.0 * std::f64::consts::PI * hour / 24.0).sin()
                + 0.1 * i as f64
                + 3.0 * (i as f64 * 1.37).sin()
        })
        .collect();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    TimeSeries::hourly(start, values).unwrap()
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("sarima_fit");
    group.sample_size(20);

    for days in [7, 14, 28].iter() {
        let series = generate_activity(*days);

        group.bench_with_input(BenchmarkId::new("(1,1,1)(1,1,1)[24]", days), days, |b, _| {
            b.iter(|| {
                let mut model = SARIMA::default();
                model.fit(black_box(&series)).unwrap();
                model
            })
        });

        group.bench_with_input(BenchmarkId::new("(1,0,0)(0,1,1)[24]", days), days, |b, _| {
            b.iter(|| {
                let mut model = SARIMA::new(1, 0, 0, 0, 1, 1, 24);
                model.fit(black_box(&series)).unwrap();
                model
            })
        });
    }

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let mut model = SARIMA::default();
    model.fit(&generate_activity(14)).unwrap();

    c.bench_function("sarima_predict_48_with_intervals", |b| {
        b.iter(|| model.predict_with_intervals(black_box(48), 0.95).unwrap())
    });
}

fn bench_intervals(c: &mut Criterion) {
    let points: Vec<f64> = (0..1000).map(|i| i as f64).collect();
    let ses: Vec<f64> = (0..1000).map(|i| 1.0 + (i as f64).sqrt()).collect();

    c.bench_function("confidence_intervals_1000", |b| {
        b.iter(|| confidence_intervals(black_box(&points), black_box(&ses), 0.95).unwrap())
    });
}

criterion_group!(benches, bench_fit, bench_predict, bench_intervals);
criterion_main!(benches);
