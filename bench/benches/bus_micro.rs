//! Bus microbenchmarks using Criterion.
//!
//! These benchmarks measure individual bus operations in isolation:
//! - Queueing events with `fire`
//! - Flushing a full queue
//! - Immediate delivery
//! - Sink add/remove

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rusty_bench::events::{Damage, Tally};
use rusty_bus::{Bus, Config, Dispatch, LockScope};

fn configs() -> [(&'static str, Config); 4] {
    let base = Config::default();
    [
        ("global_snapshot", base),
        ("global_locked", base.with_dispatch(Dispatch::Locked)),
        ("sharded_snapshot", base.with_lock_scope(LockScope::Sharded)),
        (
            "sharded_locked",
            base.with_lock_scope(LockScope::Sharded)
                .with_dispatch(Dispatch::Locked),
        ),
    ]
}

fn damage(amount: i64) -> Damage {
    Damage { target: 0, amount }
}

fn bus_with_listeners(config: Config, count: usize) -> (Bus, Vec<Arc<Tally>>) {
    let bus = Bus::with_config(config);
    let listeners: Vec<_> = (0..count).map(|_| Arc::new(Tally::default())).collect();
    {
        let mut sink = bus.sink(Damage::NAME);
        for listener in &listeners {
            sink.add(listener);
        }
    }
    (bus, listeners)
}

// =============================================================================
// Fire Benchmarks
// =============================================================================

fn bench_fire(c: &mut Criterion) {
    let mut group = c.benchmark_group("fire");

    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("queue", count), &count, |b, &n| {
            let bus = Bus::new();
            b.iter(|| {
                for i in 0..n {
                    bus.fire(damage(i as i64));
                }
                // Empty the queue without listeners so the next sample starts clean.
                black_box(bus.flush());
            });
        });
    }

    group.finish();
}

// =============================================================================
// Flush Benchmarks
// =============================================================================

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush");

    for (label, config) in configs() {
        for listeners in [1, 8] {
            let events = 1_000;
            group.throughput(Throughput::Elements((events * listeners) as u64));

            group.bench_with_input(
                BenchmarkId::new(label, format!("{listeners}_listeners")),
                &listeners,
                |b, &l| {
                    let (bus, _listeners) = bus_with_listeners(config, l);
                    b.iter_batched(
                        || {
                            for i in 0..events {
                                bus.fire(damage(i as i64));
                            }
                        },
                        |()| black_box(bus.flush()),
                        criterion::BatchSize::SmallInput,
                    );
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// Immediate Delivery Benchmarks
// =============================================================================

fn bench_fire_immediate(c: &mut Criterion) {
    let mut group = c.benchmark_group("fire_immediate");
    group.throughput(Throughput::Elements(1));

    for (label, config) in configs() {
        group.bench_function(BenchmarkId::new(label, "4_listeners"), |b| {
            let (bus, _listeners) = bus_with_listeners(config, 4);
            let event = damage(1);
            b.iter(|| black_box(bus.fire_immediate(&event)));
        });
    }

    // No listeners: measures lookup plus the dropped-event path.
    group.bench_function("unregistered", |b| {
        let bus = Bus::new();
        let event = damage(1);
        b.iter(|| black_box(bus.fire_immediate(&event)));
    });

    group.finish();
}

// =============================================================================
// Sink Benchmarks
// =============================================================================

fn bench_sink(c: &mut Criterion) {
    let mut group = c.benchmark_group("sink");

    for existing in [0, 100] {
        group.bench_with_input(
            BenchmarkId::new("add_remove", existing),
            &existing,
            |b, &n| {
                let (bus, _listeners) = bus_with_listeners(Config::default(), n);
                let listener = Arc::new(Tally::default());
                b.iter(|| {
                    let mut sink = bus.sink(Damage::NAME);
                    sink.add(&listener);
                    black_box(sink.remove(&listener))
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_fire,
    bench_flush,
    bench_fire_immediate,
    bench_sink,
);

criterion_main!(benches);
