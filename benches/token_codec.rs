use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::thread;
use timeclock_token::{
    AttendanceStore, Cedula, CheckInService, CodecConfig, MemoryAttendanceStore, SystemClock,
    TokenCodec,
};

fn codec() -> TokenCodec {
    let config = CodecConfig::builder()
        .with_secret("bench-secret")
        .build()
        .expect("valid config");
    TokenCodec::new(config, Arc::new(SystemClock::new()))
}

/// Benchmark token derivation
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let codec = codec();

    group.bench_function("generate", |b| b.iter(|| black_box(codec.generate())));

    let window = codec.current_window();
    group.bench_function("token_for_window", |b| {
        b.iter(|| black_box(codec.token_for(black_box(&window))))
    });

    group.finish();
}

/// Benchmark each validation path
fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    let codec = codec();
    let current = codec.generate();
    let stale = codec.token_for(&codec.current_window().previous().previous());

    group.bench_function("current", |b| {
        b.iter(|| black_box(codec.validate(black_box(current.as_str()))))
    });

    // Worst case: both digests computed
    group.bench_function("mismatch", |b| {
        b.iter(|| black_box(codec.validate(black_box(stale.as_str()))))
    });

    group.bench_function("empty", |b| {
        b.iter(|| black_box(codec.validate(black_box(""))))
    });

    group.finish();
}

/// Benchmark validation throughput across threads sharing one codec
fn bench_concurrent_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_validate");

    for num_threads in [2, 4, 8].iter() {
        let ops_per_thread = 1_000;
        group.throughput(Throughput::Elements((num_threads * ops_per_thread) as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(num_threads),
            num_threads,
            |b, &num_threads| {
                let codec = codec();
                b.iter(|| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let codec = codec.clone();
                            thread::spawn(move || {
                                let token = codec.generate();
                                for _ in 0..ops_per_thread {
                                    black_box(codec.validate(token.as_str()));
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().expect("bench thread panicked");
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the check-in path into the in-memory store
fn bench_check_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_in");
    let service = CheckInService::new(codec(), Arc::new(MemoryAttendanceStore::new()));

    group.bench_function("register", |b| {
        b.iter(|| {
            let token = service.codec().generate();
            black_box(service.register("0912345678", token.as_str()))
        })
    });

    let store = MemoryAttendanceStore::new();
    let record = timeclock_token::AttendanceRecord {
        cedula: Cedula::parse("0912345678").expect("non-blank"),
        token: codec().generate().into_string(),
        recorded_at: chrono::Utc::now().naive_utc(),
    };
    group.bench_function("store_insert", |b| {
        b.iter(|| black_box(store.insert(record.clone())))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_generate,
    bench_validate,
    bench_concurrent_validate,
    bench_check_in
);
criterion_main!(benches);
