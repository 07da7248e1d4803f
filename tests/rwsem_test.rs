/*!
 * Biased Reader-Writer Lock Integration Tests
 *
 * Mutual exclusion, writer liveness and reader accounting under real threads
 */

use biased_rwsem::{
    run_stress, BiasedRwCell, BiasedRwLock, StrategyType, StressConfig, SyncConfig,
};
use pretty_assertions::assert_eq;
use rand::Rng;
use serial_test::serial;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
#[serial]
fn test_round_trip_stress() {
    // 8 readers x 10000 cycles, a write every 100 cycles
    let config = StressConfig::default();
    let report = run_stress(&config).unwrap();

    assert!(report.is_clean(), "{:?}", report);
    assert_eq!(report.reads, 80_000);
    assert_eq!(report.writes, 100);
    assert_eq!(report.final_readers, 0);
    assert_eq!(report.stats.writes, 100);
    assert_eq!(report.stats.reads(), 80_000);
}

#[test]
#[serial]
fn test_round_trip_every_strategy() {
    for strategy in [StrategyType::Futex, StrategyType::Condvar, StrategyType::SpinWait] {
        let config = StressConfig {
            threads: 4,
            iterations: 2_000,
            write_every: 20,
            record_log: true,
            lock: SyncConfig::default().with_strategy(strategy),
        };
        let report = run_stress(&config).unwrap();

        assert!(report.is_clean(), "{:?}: {:?}", strategy, report);
        assert_eq!(report.writes, 100);
    }
}

#[test]
#[serial]
fn test_more_threads_than_units() {
    let config = StressConfig {
        threads: 6,
        iterations: 1_000,
        write_every: 10,
        record_log: false,
        lock: SyncConfig::default().with_units(2),
    };
    let report = run_stress(&config).unwrap();

    assert!(report.is_clean(), "{:?}", report);
    assert_eq!(report.stats.units, 2);
}

#[test]
fn test_writer_sees_consistent_pair() {
    let cell = Arc::new(BiasedRwCell::new((0u64, 0u64)).unwrap());
    let stop = Arc::new(AtomicBool::new(false));
    let torn = Arc::new(AtomicU64::new(0));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cell = cell.clone();
            let stop = stop.clone();
            let torn = torn.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let pair = cell.read();
                    if pair.0 != pair.1 {
                        torn.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for _ in 0..200 {
        let mut pair = cell.write();
        pair.0 += 1;
        thread::yield_now();
        pair.1 += 1;
    }

    stop.store(true, Ordering::Relaxed);
    for handle in readers {
        handle.join().unwrap();
    }

    assert_eq!(torn.load(Ordering::Relaxed), 0);
    assert_eq!(*cell.read(), (200, 200));
}

#[test]
fn test_writer_makes_progress_under_read_load() {
    const READERS: usize = 4;

    let lock = Arc::new(BiasedRwLock::new().unwrap());
    let stop = Arc::new(AtomicBool::new(false));
    let started = Arc::new(AtomicUsize::new(0));

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let lock = lock.clone();
            let stop = stop.clone();
            let started = started.clone();
            thread::spawn(move || {
                let mut cycles = 0u64;
                loop {
                    drop(lock.read());
                    cycles += 1;
                    if cycles == 1 {
                        started.fetch_add(1, Ordering::SeqCst);
                    }
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                }
                cycles
            })
        })
        .collect();

    // Every reader is looping before the first write
    while started.load(Ordering::SeqCst) < READERS {
        thread::yield_now();
    }

    for _ in 0..50 {
        let _write = lock.write();
    }

    // All writes completed with the readers still running
    assert_eq!(lock.stats().writes, 50);
    assert!(readers.iter().all(|h| !h.is_finished()));

    stop.store(true, Ordering::Relaxed);
    let cycles: Vec<u64> = readers.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(cycles.iter().all(|&c| c >= 1));
    assert_eq!(lock.reader_count(), 0);
}

#[test]
fn test_random_hold_times_exclusive() {
    let lock = Arc::new(BiasedRwLock::with_config(SyncConfig::default().with_units(4)).unwrap());
    let writer_inside = Arc::new(AtomicBool::new(false));
    let stop = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicU64::new(0));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let lock = lock.clone();
            let writer_inside = writer_inside.clone();
            let stop = stop.clone();
            let overlaps = overlaps.clone();
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                while !stop.load(Ordering::Relaxed) {
                    let _read = lock.read();
                    for _ in 0..rng.gen_range(0..200) {
                        if writer_inside.load(Ordering::SeqCst) {
                            overlaps.fetch_add(1, Ordering::Relaxed);
                        }
                        std::hint::spin_loop();
                    }
                }
            })
        })
        .collect();

    let mut rng = rand::thread_rng();
    for _ in 0..30 {
        let write = lock.write();
        writer_inside.store(true, Ordering::SeqCst);
        thread::sleep(Duration::from_micros(rng.gen_range(0..200)));
        writer_inside.store(false, Ordering::SeqCst);
        drop(write);
        thread::sleep(Duration::from_micros(rng.gen_range(0..500)));
    }

    stop.store(true, Ordering::Relaxed);
    for handle in readers {
        handle.join().unwrap();
    }

    assert_eq!(overlaps.load(Ordering::Relaxed), 0);
    assert_eq!(lock.reader_count(), 0);
}

#[test]
fn test_zero_readers_write() {
    let lock = BiasedRwLock::with_config(SyncConfig::default().with_units(4)).unwrap();

    {
        let _write = lock.write();
        assert!(lock.is_write_locked());
    }

    let stats = lock.stats();
    assert_eq!(stats.last_drained, 0);
    assert_eq!(stats.writer_waits, 0);
    assert_eq!(stats.active_readers, 0);
    assert!(!lock.is_write_locked());
}

#[test]
fn test_drain_sums_readers_from_every_thread() {
    const READERS: usize = 5;

    let lock = Arc::new(BiasedRwLock::with_config(SyncConfig::default().with_units(3)).unwrap());
    let acquired = Arc::new(Barrier::new(READERS + 1));
    let release = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let lock = lock.clone();
            let acquired = acquired.clone();
            let release = release.clone();
            thread::spawn(move || {
                lock.acquire_read();
                acquired.wait();
                while !release.load(Ordering::SeqCst) {
                    thread::yield_now();
                }
                lock.release_read();
            })
        })
        .collect();

    acquired.wait();
    assert_eq!(lock.reader_count(), READERS as isize);

    let writer = {
        let lock = lock.clone();
        thread::spawn(move || {
            lock.acquire_write();
            let drained = lock.stats().last_drained;
            unsafe { lock.release_write() };
            drained
        })
    };

    // Let the writer get past its first barrier before readers leave
    while lock.stats().barriers == 0 {
        thread::yield_now();
    }
    thread::sleep(Duration::from_millis(20));
    release.store(true, Ordering::SeqCst);

    for handle in readers {
        handle.join().unwrap();
    }
    assert_eq!(writer.join().unwrap(), READERS as i64);
    assert_eq!(lock.reader_count(), 0);
}

#[test]
fn test_release_on_other_thread() {
    let lock = Arc::new(BiasedRwLock::with_config(SyncConfig::default().with_units(4)).unwrap());

    let guard_lock = lock.clone();
    let handle = thread::spawn(move || {
        let guard = guard_lock.read();
        assert_eq!(guard.lock().reader_count(), 1);
        std::mem::forget(guard);
    });
    handle.join().unwrap();
    assert_eq!(lock.reader_count(), 1);

    // Release from a different thread than the acquire
    lock.release_read();
    assert_eq!(lock.reader_count(), 0);

    // A writer still gets in: the counters sum to zero
    let _write = lock.write();
    assert_eq!(lock.stats().last_drained, 0);
}

#[test]
fn test_single_thread_units_stay_non_negative() {
    let lock = BiasedRwLock::with_config(SyncConfig::default().with_units(4)).unwrap();

    for _ in 0..1_000 {
        lock.acquire_read();
        lock.acquire_read();
        lock.release_read();
        lock.release_read();
    }

    assert!(lock.unit_readers().iter().all(|&n| n >= 0));
    assert_eq!(lock.reader_count(), 0);
    assert_eq!(lock.stats().fast_reads, 2_000);
}

#[test]
fn test_low_latency_preset() {
    let lock = BiasedRwLock::with_config(SyncConfig::low_latency()).unwrap();
    assert_eq!(lock.wait_strategy(), "spinwait");

    let _read = lock.read();
    assert_eq!(lock.reader_count(), 1);
}
