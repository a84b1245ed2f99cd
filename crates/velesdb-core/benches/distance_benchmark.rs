//! Distance kernel benchmarks.
//!
//! Run with: `cargo bench --bench distance_benchmark`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use velesdb_core::DistanceMetric;

fn generate_vector(dim: usize, seed: u64) -> Vec<f32> {
    (0..dim).map(|i| ((seed as f32 * 0.1 + i as f32 * 0.01).sin() + 1.0) / 2.0).collect()
}

fn bench_distance_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_metrics");

    for dim in [128, 768, 1536] {
        let a = generate_vector(dim, 1);
        let b = generate_vector(dim, 2);

        for metric in [
            DistanceMetric::Cosine,
            DistanceMetric::Euclidean,
            DistanceMetric::Dot,
            DistanceMetric::Manhattan,
        ] {
            group.bench_with_input(BenchmarkId::new(metric.to_string(), dim), &dim, |bencher, _| {
                bencher.iter(|| black_box(metric.distance(black_box(&a), black_box(&b)).unwrap()));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_distance_metrics);
criterion_main!(benches);
