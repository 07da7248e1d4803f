/*!
 * Biased Reader-Writer Semaphore
 *
 * Reader-writer lock for read-mostly data: readers update only their own
 * execution unit's counter, writers pay for two quiescence barriers.
 *
 * # Use Cases
 *
 * - **Configuration tables**: read on every request, replaced rarely
 * - **Mount / route tables**: hot lookups, occasional reconfiguration
 */

mod cell;
mod guard;
mod lock;
mod stats;

pub use cell::{BiasedRwCell, CellReadGuard, CellWriteGuard};
pub use guard::{ReadGuard, WriteGuard};
pub use lock::BiasedRwLock;
pub use stats::LockStats;
