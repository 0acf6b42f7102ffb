use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use f1i_core::model::{Lap, LapTelemetry, Position, TelemetrySample};
use f1i_core::normalize::normalize_positions;
use f1i_core::units::Seconds;
use f1i_core::{analyze, CompareOptions};

/// Lap on an oval of ~5 km sampled every `step` meters at `pace` m/s
fn create_lap(driver: &str, step: f64, pace: f64) -> LapTelemetry {
    let length = 5000.0;
    let count = (length / step) as usize;
    let samples = (0..=count)
        .map(|i| {
            let distance = i as f64 * step;
            let angle = distance / length * std::f64::consts::TAU;
            TelemetrySample {
                time_offset: 3600.0 + distance / pace,
                distance,
                position: Some(Position::new(1200.0 * angle.cos(), 700.0 * angle.sin())),
            }
        })
        .collect();
    LapTelemetry::new(Lap::new(driver, 1, Some(Seconds(length / pace))), samples)
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("track_dominance");

    // ~4 Hz car data up to ~20 Hz merged telemetry
    for step in [20.0, 10.0, 4.0] {
        let reference = create_lap("VER", step, 62.0);
        let other = create_lap("HAM", step * 1.3, 61.5);
        let options = CompareOptions::default();

        group.bench_with_input(
            BenchmarkId::new("analyze", reference.samples.len()),
            &(reference, other),
            |b, (reference, other)| {
                b.iter(|| black_box(analyze(reference, other, &options).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let lap = create_lap("VER", 4.0, 62.0);

    c.bench_function("normalize_positions", |b| {
        b.iter(|| black_box(normalize_positions(&lap.samples, 800.0, 600.0)));
    });
}

criterion_group!(benches, bench_analyze, bench_normalize);
criterion_main!(benches);
