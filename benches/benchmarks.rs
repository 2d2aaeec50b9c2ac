//! Benchmarks for faststats
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use faststats::{Stats, StatsConfig};

fn sample(i: u64) -> f64 {
    // deterministic spread over [0, 1000)
    ((i.wrapping_mul(2_654_435_761) % 1_000_000) as f64) / 1000.0
}

fn filled(config: &StatsConfig, n: u64) -> Stats {
    let mut s = Stats::with_config(config).unwrap();
    s.push_all((0..n).map(sample));
    s
}

fn configs() -> Vec<(&'static str, StatsConfig)> {
    vec![
        ("exact", StatsConfig::new()),
        (
            "fixed_width",
            StatsConfig::new().store_data(false).bucket_precision(10.0),
        ),
        (
            "edges_extending",
            StatsConfig::new()
                .store_data(false)
                .buckets([1.0, 10.0, 100.0])
                .bucket_extension_interval(100.0),
        ),
    ]
}

// ============================================================================
// Insertion
// ============================================================================

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    group.throughput(Throughput::Elements(1));

    for (name, config) in configs() {
        group.bench_function(name, |b| {
            let mut s = Stats::with_config(&config).unwrap();
            let mut i = 0u64;
            b.iter(|| {
                s.push(sample(i));
                i = i.wrapping_add(1);
            });
        });
    }

    group.bench_function("push_pop_exact", |b| {
        let mut s = filled(&StatsConfig::new(), 10_000);
        let mut i = 0u64;
        b.iter(|| {
            s.push(sample(i));
            black_box(s.shift().unwrap());
            i = i.wrapping_add(1);
        });
    });

    group.finish();
}

// ============================================================================
// Queries
// ============================================================================

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    for (name, config) in configs() {
        let s = filled(&config, 100_000);
        group.bench_with_input(BenchmarkId::new("percentile", name), &s, |b, s| {
            b.iter(|| black_box(s.percentile(black_box(90.0))));
        });
        group.bench_with_input(BenchmarkId::new("stddev", name), &s, |b, s| {
            b.iter(|| black_box(s.stddev()));
        });
    }

    // sorted snapshot rebuilt after every mutation
    group.bench_function("median_after_push", |b| {
        let mut s = filled(&StatsConfig::new(), 10_000);
        let mut i = 0u64;
        b.iter(|| {
            s.push(sample(i));
            i = i.wrapping_add(1);
            black_box(s.median())
        });
    });

    let hist = filled(&StatsConfig::new().store_data(false).bucket_precision(1.0), 100_000);
    group.bench_function("distribution", |b| {
        b.iter(|| black_box(hist.distribution().unwrap()));
    });

    group.finish();
}

// ============================================================================
// Filters
// ============================================================================

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");

    for (name, config) in configs() {
        let s = filled(&config, 10_000);
        group.bench_with_input(BenchmarkId::new("iqr", name), &s, |b, s| {
            b.iter(|| black_box(s.iqr()));
        });
        group.bench_with_input(BenchmarkId::new("copy", name), &s, |b, s| {
            b.iter(|| black_box(s.copy()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_push, bench_queries, bench_filters);
criterion_main!(benches);
