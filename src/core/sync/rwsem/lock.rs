/*!
 * Biased Reader-Writer Lock
 *
 * Readers normally touch only their own execution unit's counter. A writer
 * takes `writer`, which readers observe and treat as "use the slow path",
 * issues a quiescence barrier, then drains the per-unit counters into the
 * single atomic `slow` counter. From that point every reader accounts
 * through `slow`, and the writer waits for it to reach zero.
 *
 * # Why the barrier is enough
 *
 * The fast path is check-then-increment inside a pinned region. A reader
 * racing a starting writer either finished its increment before the
 * barrier (the drain sees it) or is still pinned and the barrier waits for
 * it, or it pins after the barrier and sees `writer` held. No reader can
 * skip both the counter and the slow path.
 */

use super::guard::{ReadGuard, WriteGuard};
use super::stats::{LockStats, SlowPathStats};
use crate::core::errors::RwSemResult;
use crate::core::hints::{likely, unlikely};
use crate::core::sync::config::SyncConfig;
use crate::core::sync::percpu::PerCpu;
use crate::core::sync::wait::WaitQueue;
use parking_lot::lock_api::{RawMutex as RawMutexApi, RawRwLock as RawRwLockApi};
use parking_lot::{RawMutex, RawRwLock};
use std::sync::atomic::{fence, AtomicIsize, AtomicU64, Ordering};
use tracing::{debug, trace};

/// Per-unit fast path state
#[derive(Debug, Default)]
pub(super) struct UnitCounters {
    /// Readers accounted on this unit; may go negative when a reader
    /// releases on a different unit than it acquired on
    readers: AtomicIsize,
    /// Fast-path read acquisitions on this unit
    fast_reads: AtomicU64,
}

/// Reader-writer lock biased towards readers
///
/// # Performance
///
/// - **Read, no writer**: one uncontended CAS on a per-unit cache line, no
///   shared writes, never blocks
/// - **Read, writer active**: shared `RawRwLock` plus one atomic on `slow`
/// - **Write**: two quiescence barriers per cycle, O(units) each; meant for
///   very rare writers
///
/// # Caller Contract
///
/// Acquisition is not recursive. A thread holding read access that calls
/// `acquire_write` on the same lock deadlocks; so does a second
/// `acquire_read` once a writer has started waiting.
///
/// # Example
///
/// ```
/// use biased_rwsem::BiasedRwLock;
///
/// let lock = BiasedRwLock::new().unwrap();
///
/// {
///     let _read = lock.read();
///     assert_eq!(lock.reader_count(), 1);
/// }
///
/// {
///     let _write = lock.write();
///     assert!(lock.is_write_locked());
/// }
/// ```
pub struct BiasedRwLock {
    /// Per-execution-unit reader counters
    fast: PerCpu<UnitCounters>,
    /// Reader count once a writer has drained the fast counters
    slow: AtomicIsize,
    /// Serializes writers; "held" tells readers to take the slow path
    writer: RawMutex,
    /// Shared by slow-path readers, exclusive for the writer
    exclusion: RawRwLock,
    /// Writer sleeps here until `slow` reaches zero
    writer_wait: WaitQueue,
    stats: SlowPathStats,
}

impl BiasedRwLock {
    /// Create a lock with the default configuration
    pub fn new() -> RwSemResult<Self> {
        Self::with_config(SyncConfig::default())
    }

    /// Create a lock with an explicit configuration
    ///
    /// Fails with `AllocationFailed` when the per-unit counters cannot be
    /// allocated and with `InvalidConfig` for unusable configurations. The
    /// unit count is clamped to `MAX_EXECUTION_UNITS` first, so in practice
    /// only an exhausted allocator produces `AllocationFailed` here.
    pub fn with_config(config: SyncConfig) -> RwSemResult<Self> {
        config.validate()?;

        let units = config.resolved_units();
        let fast = PerCpu::try_new(units, |_| UnitCounters::default())?
            .with_barrier_spins(config.barrier_spins);
        let writer_wait = WaitQueue::new(&config);

        debug!(
            units,
            strategy = writer_wait.strategy_name(),
            "Biased rwsem initialized"
        );

        Ok(Self {
            fast,
            slow: AtomicIsize::new(0),
            writer: <RawMutex as RawMutexApi>::INIT,
            exclusion: <RawRwLock as RawRwLockApi>::INIT,
            writer_wait,
            stats: SlowPathStats::default(),
        })
    }

    /// Apply `delta` to this unit's counter unless a writer is present
    #[inline]
    fn update_fast(&self, delta: isize) -> bool {
        let unit = self.fast.pin();
        if unlikely(self.writer.is_locked()) {
            return false;
        }

        // Pinned: no other thread can touch this unit's counter, and the
        // writer only drains after a barrier
        unit.readers
            .store(unit.readers.load(Ordering::Relaxed) + delta, Ordering::Relaxed);
        if delta > 0 {
            unit.fast_reads
                .store(unit.fast_reads.load(Ordering::Relaxed) + 1, Ordering::Relaxed);
        }

        // Pairs with the release of `writer` by the previous writer
        fence(Ordering::Acquire);
        true
    }

    /// Acquire read access, blocking only while a writer is active
    #[inline]
    pub fn acquire_read(&self) {
        if likely(self.update_fast(1)) {
            return;
        }

        self.exclusion.lock_shared();
        self.slow.fetch_add(1, Ordering::SeqCst);
        // SAFETY: shared lock taken just above on this thread
        unsafe { self.exclusion.unlock_shared() };

        SlowPathStats::bump(&self.stats.slow_reads);
        trace!("Reader took the slow path");
    }

    /// Release read access taken by `acquire_read`
    ///
    /// May run on a different thread than the matching acquire. Calling it
    /// without a matching acquire corrupts the reader count.
    #[inline]
    pub fn release_read(&self) {
        if likely(self.update_fast(-1)) {
            return;
        }

        // A spurious wake is possible here but harmless: the writer re-checks
        if self.slow.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.writer_wait.wake_all();
        }
    }

    /// Sum and zero every unit's counter
    ///
    /// Only valid with `writer` held and after a quiescence barrier.
    fn clear_fast(&self) -> isize {
        self.fast
            .iter()
            .map(|unit| unit.readers.swap(0, Ordering::Relaxed))
            .sum()
    }

    /// Acquire exclusive access
    ///
    /// Blocks until no other writer holds the lock and every reader that
    /// entered before this call has released.
    pub fn acquire_write(&self) {
        // Also switches readers to the slow path, see `update_fast`
        self.writer.lock();

        // Readers now either see `writer` held or have finished their
        // counter update, and we see every such update
        self.fast.synchronize();
        SlowPathStats::bump(&self.stats.barriers);

        // Nobody can use the fast counters; move their sum into `slow`
        let drained = self.clear_fast();
        self.slow.fetch_add(drained, Ordering::SeqCst);
        self.stats
            .last_drained
            .store(drained as i64, Ordering::Relaxed);

        // Block new slow-path readers
        self.exclusion.lock_exclusive();

        // Wait for every reader counted above to release
        let outcome = self
            .writer_wait
            .wait_until(|| self.slow.load(Ordering::SeqCst) == 0);
        if outcome.waited() {
            SlowPathStats::bump(&self.stats.writer_waits);
        }
        SlowPathStats::bump(&self.stats.writes);

        debug!(drained, waited = outcome.waited(), "Writer acquired exclusive access");
    }

    /// Release exclusive access
    ///
    /// # Safety
    ///
    /// The calling thread must hold the write side, taken by
    /// `acquire_write` on this lock and not yet released.
    pub unsafe fn release_write(&self) {
        // Let new readers in, on the slow path only
        self.exclusion.unlock_exclusive();

        // Make the next fast-path reader see everything this writer did
        self.fast.synchronize();
        SlowPathStats::bump(&self.stats.barriers);

        self.writer.unlock();
        trace!("Writer released exclusive access");
    }

    /// Acquire read access for the lifetime of the returned guard
    #[inline]
    pub fn read(&self) -> ReadGuard<'_> {
        self.acquire_read();
        ReadGuard::new(self)
    }

    /// Acquire exclusive access for the lifetime of the returned guard
    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire_write();
        WriteGuard::new(self)
    }

    /// Whether a writer currently holds or is acquiring the lock
    #[inline]
    pub fn is_write_locked(&self) -> bool {
        self.writer.is_locked()
    }

    /// Approximate number of readers holding the lock
    ///
    /// Exact when no acquire or release is in flight.
    pub fn reader_count(&self) -> isize {
        let fast: isize = self
            .fast
            .iter()
            .map(|unit| unit.readers.load(Ordering::Relaxed))
            .sum();
        fast + self.slow.load(Ordering::SeqCst)
    }

    /// Number of execution units
    #[inline]
    pub fn units(&self) -> usize {
        self.fast.len()
    }

    /// Name of the writer wait strategy
    pub fn wait_strategy(&self) -> &'static str {
        self.writer_wait.strategy_name()
    }

    /// Snapshot of lock activity
    pub fn stats(&self) -> LockStats {
        LockStats {
            units: self.fast.len(),
            fast_reads: self
                .fast
                .iter()
                .map(|unit| unit.fast_reads.load(Ordering::Relaxed))
                .sum(),
            slow_reads: self.stats.slow_reads.load(Ordering::Relaxed),
            writes: self.stats.writes.load(Ordering::Relaxed),
            writer_waits: self.stats.writer_waits.load(Ordering::Relaxed),
            barriers: self.stats.barriers.load(Ordering::Relaxed),
            last_drained: self.stats.last_drained.load(Ordering::Relaxed),
            active_readers: self.reader_count() as i64,
        }
    }

    /// Per-unit reader counters (diagnostic, racy)
    pub fn unit_readers(&self) -> Vec<isize> {
        self.fast
            .iter()
            .map(|unit| unit.readers.load(Ordering::Relaxed))
            .collect()
    }
}

impl Drop for BiasedRwLock {
    fn drop(&mut self) {
        trace!(units = self.fast.len(), "Biased rwsem destroyed");
    }
}

impl std::fmt::Debug for BiasedRwLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiasedRwLock")
            .field("units", &self.fast.len())
            .field("write_locked", &self.is_write_locked())
            .field("readers", &self.reader_count())
            .field("writer_wait", &self.writer_wait)
            .finish()
    }
}
