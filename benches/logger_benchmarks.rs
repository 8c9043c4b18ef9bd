//! Criterion benchmarks for rust_logger_tree

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_logger_tree::core::DEFAULT_RECORD_FORMAT;
use rust_logger_tree::info;
use rust_logger_tree::prelude::*;
use std::thread;
use tempfile::TempDir;

/// Logger whose records are rendered but discarded
fn discarding_logger(registry: &Registry, name: &str) -> Logger {
    let logger = registry.resolve(name);
    logger.set_level(LogLevel::Debug);
    logger.set_writer("sink", std::io::sink());
    logger
}

// ============================================================================
// Registry Benchmarks
// ============================================================================

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    group.throughput(Throughput::Elements(1));

    let registry = Registry::new();
    let _held = registry.resolve("app.db.pool.conn");

    group.bench_function("existing_depth_4", |b| {
        b.iter(|| black_box(registry.resolve(black_box("app.db.pool.conn"))));
    });

    group.bench_function("create_and_release_depth_3", |b| {
        b.iter(|| black_box(registry.resolve(black_box("fresh.branch.leaf"))));
    });

    group.bench_function("root", |b| {
        b.iter(|| black_box(registry.resolve_root()));
    });

    group.finish();
}

fn bench_effective_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("effective_level");

    for depth in [1usize, 4, 16] {
        let registry = Registry::new();
        let name = (0..depth)
            .map(|i| format!("n{}", i))
            .collect::<Vec<_>>()
            .join(".");
        let logger = registry.resolve(&name);

        group.bench_with_input(BenchmarkId::from_parameter(depth), &logger, |b, logger| {
            b.iter(|| black_box(logger.effective_level()));
        });
    }

    group.finish();
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let registry = Registry::new();
    let logger = discarding_logger(&registry, "bench");

    group.bench_function("filtered", |b| {
        logger.set_level(LogLevel::Error);
        b.iter(|| logger.debug(black_box("Debug message")));
        logger.set_level(LogLevel::Debug);
    });

    group.bench_function("plain_message", |b| {
        b.iter(|| logger.info(black_box("Info message")));
    });

    group.bench_function("format_args", |b| {
        b.iter(|| info!(logger, "request {} took {}ms", black_box(42), black_box(17)));
    });

    let child = registry.resolve("bench.child.grandchild");
    group.bench_function("propagate_depth_3", |b| {
        b.iter(|| child.info(black_box("Propagated message")));
    });

    group.finish();
}

fn bench_file_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_dispatch");
    group.throughput(Throughput::Elements(1));

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let registry = Registry::new();
    let logger = registry.resolve("file");
    logger
        .set_logfile(temp_dir.path().join("bench.log"))
        .expect("Failed to open log file");

    group.bench_function("error", |b| {
        b.iter(|| logger.error(black_box("Error message")));
    });

    group.finish();
}

fn bench_concurrent_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_dispatch");

    for threads in [2usize, 4, 8] {
        let registry = Registry::new();
        let logger = discarding_logger(&registry, "concurrent");
        let records_per_thread = 1000;
        group.throughput(Throughput::Elements((threads * records_per_thread) as u64));

        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let logger = logger.clone();
                        thread::spawn(move || {
                            for i in 0..records_per_thread {
                                info!(logger, "thread {} record {}", t, i);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatter");
    group.throughput(Throughput::Elements(1));

    let default = Formatter::new(DEFAULT_RECORD_FORMAT, "%Y/%m/%d:%H:%M:%S", true);
    group.bench_function("default_template", |b| {
        b.iter(|| black_box(default.render(black_box("message"), "app.db", LogLevel::Error)));
    });

    let no_time = Formatter::new("[%L] %N%m", "", true);
    group.bench_function("no_timestamp", |b| {
        b.iter(|| black_box(no_time.render(black_box("message"), "app.db", LogLevel::Error)));
    });

    let long = "x".repeat(2048);
    group.bench_function("truncated", |b| {
        b.iter(|| black_box(no_time.render(black_box(&long), "app.db", LogLevel::Error)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_resolve,
    bench_effective_level,
    bench_dispatch,
    bench_file_dispatch,
    bench_concurrent_dispatch,
    bench_formatter,
);
criterion_main!(benches);
