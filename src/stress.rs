/*!
 * Stress Harness
 *
 * Round-trip scenario for the biased lock: N reader threads each run
 * read-acquire/release cycles while one writer thread takes the write side
 * every `write_every` cycles. Mutual exclusion is checked two ways:
 * - inline atomics (reader count vs writer flag) on every critical section
 * - an optional lock-protected interleave log replayed after the run
 */

use crate::core::errors::{RwSemError, RwSemResult};
use crate::core::limits::{
    STRESS_ITERATIONS, STRESS_MAX_LOG_EVENTS, STRESS_MAX_THREADS, STRESS_THREADS,
    STRESS_WRITE_EVERY,
};
use crate::core::sync::{BiasedRwLock, LockStats, SyncConfig};
use crate::monitoring::PhaseSpan;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread;
use tracing::{info, warn};

/// Stress scenario parameters
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Reader threads
    pub threads: usize,
    /// Read cycles per reader thread
    pub iterations: usize,
    /// One write cycle per this many read cycles per thread; 0 disables writes
    pub write_every: usize,
    /// Keep the interleave log and replay it after the run
    pub record_log: bool,
    /// Lock configuration
    pub lock: SyncConfig,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: STRESS_THREADS,
            iterations: STRESS_ITERATIONS,
            write_every: STRESS_WRITE_EVERY,
            record_log: true,
            lock: SyncConfig::default(),
        }
    }
}

impl StressConfig {
    /// Write cycles the writer thread performs
    pub fn planned_writes(&self) -> usize {
        if self.write_every == 0 {
            0
        } else {
            self.iterations / self.write_every
        }
    }

    /// Read cycles across all threads, `None` on overflow
    pub fn total_reads(&self) -> Option<usize> {
        self.threads.checked_mul(self.iterations)
    }

    /// Interleave log entries a full run records, `None` on overflow
    pub fn log_events(&self) -> Option<usize> {
        self.total_reads()?
            .checked_add(self.planned_writes())?
            .checked_mul(2)
    }

    /// Reject scenarios that cannot run to completion
    pub fn validate(&self) -> RwSemResult<()> {
        if self.threads == 0 || self.threads > STRESS_MAX_THREADS {
            return Err(RwSemError::InvalidConfig(format!(
                "threads must be in 1..={}, got {}",
                STRESS_MAX_THREADS, self.threads
            )));
        }
        if self.total_reads().is_none() {
            return Err(RwSemError::InvalidConfig(format!(
                "{} threads x {} iterations overflows",
                self.threads, self.iterations
            )));
        }
        if self.record_log {
            match self.log_events() {
                Some(events) if events <= STRESS_MAX_LOG_EVENTS => {}
                _ => {
                    return Err(RwSemError::InvalidConfig(format!(
                        "interleave log would exceed {} entries; disable it or shrink the run",
                        STRESS_MAX_LOG_EVENTS
                    )))
                }
            }
        }
        self.lock.validate()
    }
}

/// Outcome of a stress run
#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    pub threads: usize,
    pub iterations: usize,
    /// Write cycles the writer was scheduled to perform
    pub planned_writes: u64,
    /// Completed read cycles
    pub reads: u64,
    /// Completed write cycles
    pub writes: u64,
    /// Overlaps caught by the inline atomics
    pub violations: u64,
    /// Overlaps found by replaying the interleave log
    pub log_violations: u64,
    /// Entries in the interleave log (0 when not recorded)
    pub log_len: usize,
    /// `reader_count()` after every thread joined
    pub final_readers: isize,
    pub elapsed_ms: u64,
    pub stats: LockStats,
}

impl StressReport {
    /// No overlap observed, every write ran, and the reader accounting
    /// returned to zero
    pub fn is_clean(&self) -> bool {
        self.violations == 0
            && self.log_violations == 0
            && self.final_readers == 0
            && self.writes == self.planned_writes
    }
}

/// Interleave log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ReadEnter,
    ReadExit,
    WriteEnter,
    WriteExit,
}

/// Count overlaps in an interleave log
///
/// A writer entering while readers or another writer are inside, or a reader
/// entering while a writer is inside, is one violation each.
pub fn replay(log: &[Event]) -> u64 {
    let mut readers = 0i64;
    let mut writer = false;
    let mut violations = 0;

    for event in log {
        match event {
            Event::ReadEnter => {
                if writer {
                    violations += 1;
                }
                readers += 1;
            }
            Event::ReadExit => readers -= 1,
            Event::WriteEnter => {
                if writer || readers != 0 {
                    violations += 1;
                }
                writer = true;
            }
            Event::WriteExit => writer = false,
        }
    }

    violations
}

/// Shared state of one run
struct Arena {
    lock: BiasedRwLock,
    readers_inside: AtomicUsize,
    writer_inside: AtomicBool,
    violations: AtomicU64,
    progress: AtomicU64,
    readers_done: AtomicUsize,
    log: Option<Mutex<Vec<Event>>>,
}

impl Arena {
    #[inline]
    fn record(&self, event: Event) {
        if let Some(log) = &self.log {
            log.lock().push(event);
        }
    }

    fn reader(&self, iterations: usize) {
        for _ in 0..iterations {
            let guard = self.lock.read();
            self.readers_inside.fetch_add(1, Ordering::SeqCst);
            if self.writer_inside.load(Ordering::SeqCst) {
                self.violations.fetch_add(1, Ordering::Relaxed);
            }
            self.record(Event::ReadEnter);

            std::hint::spin_loop();

            self.record(Event::ReadExit);
            self.readers_inside.fetch_sub(1, Ordering::SeqCst);
            drop(guard);

            self.progress.fetch_add(1, Ordering::Relaxed);
        }
        self.readers_done.fetch_add(1, Ordering::SeqCst);
    }

    fn writer(&self, config: &StressConfig) -> u64 {
        let mut writes = 0;

        for k in 1..=config.planned_writes() {
            // Pace writes against reader progress; bounded by `total_reads`
            let due = (k * config.write_every * config.threads) as u64;
            while self.progress.load(Ordering::Relaxed) < due
                && self.readers_done.load(Ordering::SeqCst) < config.threads
            {
                thread::yield_now();
            }

            let guard = self.lock.write();
            self.writer_inside.store(true, Ordering::SeqCst);
            if self.readers_inside.load(Ordering::SeqCst) != 0 {
                self.violations.fetch_add(1, Ordering::Relaxed);
            }
            self.record(Event::WriteEnter);

            self.record(Event::WriteExit);
            self.writer_inside.store(false, Ordering::SeqCst);
            drop(guard);

            writes += 1;
        }

        writes
    }
}

/// Run the round-trip scenario
///
/// Fails on an invalid scenario or lock configuration; overlaps are
/// reported, not raised. A panic in a worker thread is propagated.
pub fn run_stress(config: &StressConfig) -> RwSemResult<StressReport> {
    config.validate()?;

    let arena = Arena {
        lock: BiasedRwLock::with_config(config.lock.clone())?,
        readers_inside: AtomicUsize::new(0),
        writer_inside: AtomicBool::new(false),
        violations: AtomicU64::new(0),
        progress: AtomicU64::new(0),
        readers_done: AtomicUsize::new(0),
        log: config.record_log.then(|| {
            Mutex::new(Vec::with_capacity(config.log_events().unwrap_or(0)))
        }),
    };

    info!(
        threads = config.threads,
        iterations = config.iterations,
        write_every = config.write_every,
        units = arena.lock.units(),
        strategy = arena.lock.wait_strategy(),
        "Starting stress run"
    );

    let phase = PhaseSpan::new("stress");
    let writes = thread::scope(|s| {
        for _ in 0..config.threads {
            s.spawn(|| arena.reader(config.iterations));
        }

        let writer = s.spawn(|| arena.writer(config));
        match writer.join() {
            Ok(writes) => writes,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    });
    let elapsed = phase.elapsed();

    let reads = arena.progress.load(Ordering::Relaxed);
    phase.record_items(reads + writes);
    drop(phase);

    let (log_violations, log_len) = match arena.log {
        Some(ref log) => {
            let log = log.lock();
            (replay(&log), log.len())
        }
        None => (0, 0),
    };

    let report = StressReport {
        threads: config.threads,
        iterations: config.iterations,
        planned_writes: config.planned_writes() as u64,
        reads,
        writes,
        violations: arena.violations.load(Ordering::Relaxed),
        log_violations,
        log_len,
        final_readers: arena.lock.reader_count(),
        elapsed_ms: elapsed.as_millis() as u64,
        stats: arena.lock.stats(),
    };

    if report.is_clean() {
        info!(
            reads = report.reads,
            writes = report.writes,
            elapsed_ms = report.elapsed_ms,
            "Stress run completed"
        );
    } else {
        warn!(
            violations = report.violations,
            log_violations = report.log_violations,
            final_readers = report.final_readers,
            writes = report.writes,
            planned_writes = report.planned_writes,
            "Stress run found mutual exclusion problems"
        );
    }

    Ok(report)
}
