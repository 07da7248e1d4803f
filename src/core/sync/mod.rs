/*!
 * Synchronization Primitives
 *
 * The biased reader-writer lock and the primitives it is built from:
 * - Per-execution-unit storage with pinned regions and a quiescence barrier
 * - Wait queues (futex, condvar, adaptive spinwait)
 * - Construction-time configuration
 *
 * # Architecture
 *
 * `rwsem::BiasedRwLock` composes `percpu::PerCpu` (fast reader counters),
 * parking_lot raw locks (writer exclusion, slow readers) and
 * `wait::WaitQueue` (writer waits for readers to drain).
 *
 * # Performance
 *
 * - Readers without a writer touch only their own cache line
 * - Cache-line aligned per-unit slots to prevent false sharing
 * - Writers are expensive by construction; use for read-mostly data
 */

mod config;
pub mod percpu;
pub mod rwsem;
pub mod wait;

pub use config::{StrategyType, SyncConfig};
pub use percpu::{PerCpu, Pinned};
pub use rwsem::{
    BiasedRwCell, BiasedRwLock, CellReadGuard, CellWriteGuard, LockStats, ReadGuard, WriteGuard,
};
pub use wait::{WaitOutcome, WaitQueue, WaitStrategy, WakeResult};
