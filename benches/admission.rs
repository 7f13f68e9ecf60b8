use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::{Duration, Instant};
use window_admission::AdmissionEngine;

/// Benchmark single-threaded decision throughput against one identity
fn bench_single_threaded_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");

    for max_requests in [10usize, 100, 1000].iter() {
        group.throughput(Throughput::Elements(1000));

        group.bench_with_input(
            BenchmarkId::new("decisions", max_requests),
            max_requests,
            |b, &max_requests| {
                let engine =
                    AdmissionEngine::<String>::new(max_requests, Duration::from_millis(50))
                        .unwrap();

                b.iter(|| {
                    for _ in 0..1000 {
                        black_box(engine.check_and_record(black_box("user1"), Instant::now()));
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark multi-threaded concurrent throughput
fn bench_concurrent_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for num_threads in [2, 4, 8].iter() {
        group.throughput(Throughput::Elements((*num_threads as u64) * 1000));

        group.bench_with_input(
            BenchmarkId::new("threads", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let engine =
                        Arc::new(AdmissionEngine::<u64>::new(100, Duration::from_secs(60)).unwrap());

                    let mut handles = vec![];
                    for i in 0..num_threads {
                        let engine = Arc::clone(&engine);
                        let handle = std::thread::spawn(move || {
                            // Each thread uses its own identity to avoid contention
                            let identity = i as u64;
                            for _ in 0..1000 {
                                black_box(engine.check_and_record(&identity, Instant::now()));
                            }
                        });
                        handles.push(handle);
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark different identity populations
fn bench_identity_diversity(c: &mut Criterion) {
    let mut group = c.benchmark_group("identity_diversity");
    group.throughput(Throughput::Elements(1000));

    // Single identity (worst case - one shard)
    group.bench_function("single_identity", |b| {
        let engine = AdmissionEngine::<u64>::new(100, Duration::from_secs(60)).unwrap();

        b.iter(|| {
            for _ in 0..1000 {
                black_box(engine.check_and_record(black_box(&7u64), Instant::now()));
            }
        })
    });

    group.bench_function("10_identities", |b| {
        let engine = AdmissionEngine::<u64>::new(100, Duration::from_secs(60)).unwrap();

        b.iter(|| {
            for i in 0..1000u64 {
                black_box(engine.check_and_record(black_box(&(i % 10)), Instant::now()));
            }
        })
    });

    group.bench_function("1000_identities", |b| {
        let engine = AdmissionEngine::<u64>::new(100, Duration::from_secs(60)).unwrap();

        b.iter(|| {
            for i in 0..1000u64 {
                black_box(engine.check_and_record(black_box(&i), Instant::now()));
            }
        })
    });

    group.finish();
}

/// Benchmark the cost of an idle sweep over a populated engine
fn bench_idle_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("idle_sweep");

    for num_identities in [100u64, 1000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("evict", num_identities),
            num_identities,
            |b, &num_identities| {
                b.iter(|| {
                    let engine = AdmissionEngine::<u64>::builder(10, Duration::from_millis(1))
                        .with_retention(Duration::from_millis(1))
                        .build()
                        .unwrap();
                    let t0 = Instant::now();

                    for i in 0..num_identities {
                        engine.check_and_record(&i, t0);
                    }

                    black_box(engine.evict_idle(t0 + Duration::from_millis(2)))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_threaded_throughput,
    bench_concurrent_throughput,
    bench_identity_diversity,
    bench_idle_sweep,
);
criterion_main!(benches);
