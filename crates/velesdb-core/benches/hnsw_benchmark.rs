//! HNSW index performance benchmarks.
//!
//! Run with: `cargo bench --bench hnsw_benchmark`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use velesdb_core::index::hnsw::{HnswIndex, HnswParams};
use velesdb_core::index::SearchOptions;
use velesdb_core::{DistanceMetric, Point, VectorIndex};

fn generate_vector(dim: usize, seed: u64) -> Vec<f32> {
    (0..dim).map(|i| ((seed as f32 * 0.1 + i as f32 * 0.01).sin() + 1.0) / 2.0).collect()
}

fn bench_hnsw_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_insert");

    for count in [1000, 10_000] {
        let dim = 768;
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("vectors", format!("{count}x{dim}d")), &count, |b, &count| {
            b.iter(|| {
                let index = HnswIndex::new(dim, DistanceMetric::Cosine, HnswParams::default());
                for i in 0..count {
                    let vector = generate_vector(dim, i as u64);
                    index.insert(&Point::new(i.to_string(), vector)).unwrap();
                }
                black_box(index.len())
            });
        });
    }

    group.finish();
}

fn bench_hnsw_search_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_search_latency");

    let dim = 768;
    let index = HnswIndex::new(dim, DistanceMetric::Cosine, HnswParams::default());
    for i in 0..10_000u64 {
        let vector = generate_vector(dim, i);
        index.insert(&Point::new(i.to_string(), vector)).unwrap();
    }

    let query = generate_vector(dim, 99999);
    let opts = SearchOptions::default();

    for k in [10, 50, 100] {
        group.bench_with_input(BenchmarkId::new("top_k", k), &k, |b, &k| {
            b.iter(|| black_box(index.search(&query, k, &opts).unwrap()));
        });
    }

    group.finish();
}

fn bench_hnsw_search_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_search_throughput");

    let dim = 768;
    let index = HnswIndex::new(dim, DistanceMetric::Cosine, HnswParams::default());
    for i in 0..10_000u64 {
        let vector = generate_vector(dim, i);
        index.insert(&Point::new(i.to_string(), vector)).unwrap();
    }

    let queries: Vec<Vec<f32>> = (0..100).map(|i| generate_vector(dim, 100_000 + i)).collect();
    let opts = SearchOptions::default();

    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("100_queries_top10", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(index.search(query, 10, &opts).unwrap());
            }
        });
    });

    group.finish();
}

fn bench_distance_metric_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_search_by_metric");

    let dim = 768;
    let query = generate_vector(dim, 0);

    for metric in [DistanceMetric::Cosine, DistanceMetric::Euclidean, DistanceMetric::Dot] {
        let index = HnswIndex::new(dim, metric, HnswParams::default());
        for i in 0..5000u64 {
            let vector = generate_vector(dim, i);
            index.insert(&Point::new(i.to_string(), vector)).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("search", metric.to_string()), &metric, |b, _| {
            b.iter(|| black_box(index.search(&query, 10, &SearchOptions::default()).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_hnsw_insert,
    bench_hnsw_search_latency,
    bench_hnsw_search_throughput,
    bench_distance_metric_search
);
criterion_main!(benches);
