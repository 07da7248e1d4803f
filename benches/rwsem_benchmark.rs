/*!
 * Biased Reader-Writer Lock Benchmarks
 *
 * Compare the biased lock's read path against parking_lot::RwLock and
 * measure the cost of a write cycle per wait strategy
 */

use biased_rwsem::{BiasedRwLock, StrategyType, SyncConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn bench_uncontended_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncontended_read");

    let biased = BiasedRwLock::new().unwrap();
    group.bench_function("biased", |b| {
        b.iter(|| {
            let guard = biased.read();
            black_box(&guard);
        });
    });

    let rwlock = RwLock::new(0u64);
    group.bench_function("parking_lot", |b| {
        b.iter(|| {
            let guard = rwlock.read();
            black_box(*guard);
        });
    });

    group.finish();
}

fn bench_contended_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_read");

    for readers in [2usize, 4, 8] {
        let biased = Arc::new(BiasedRwLock::new().unwrap());
        let stop = Arc::new(AtomicBool::new(false));
        let background: Vec<_> = (1..readers)
            .map(|_| {
                let lock = biased.clone();
                let stop = stop.clone();
                thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        black_box(lock.read());
                    }
                })
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("biased", readers), &readers, |b, _| {
            b.iter(|| black_box(biased.read()));
        });

        stop.store(true, Ordering::Relaxed);
        for handle in background {
            handle.join().unwrap();
        }

        let rwlock = Arc::new(RwLock::new(0u64));
        let stop = Arc::new(AtomicBool::new(false));
        let background: Vec<_> = (1..readers)
            .map(|_| {
                let lock = rwlock.clone();
                let stop = stop.clone();
                thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        black_box(*lock.read());
                    }
                })
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("parking_lot", readers), &readers, |b, _| {
            b.iter(|| black_box(*rwlock.read()));
        });

        stop.store(true, Ordering::Relaxed);
        for handle in background {
            handle.join().unwrap();
        }
    }

    group.finish();
}

fn bench_write_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_cycle");

    for strategy in [StrategyType::Futex, StrategyType::Condvar, StrategyType::SpinWait] {
        let lock = BiasedRwLock::with_config(SyncConfig::default().with_strategy(strategy)).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", strategy)),
            &lock,
            |b, lock| {
                b.iter(|| black_box(lock.write()));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_uncontended_read,
    bench_contended_read,
    bench_write_cycle
);
criterion_main!(benches);
