/*!
 * Wait/Notify Primitives
 *
 * Blocking wait-until-condition queue with multiple strategies:
 * - Futex-based (parking_lot_core, fastest on Linux)
 * - Condvar-based (cross-platform, reliable)
 * - Spinwait-based (low-latency, high-CPU)
 */

mod condvar;
mod futex;
mod queue;
mod spinwait;
mod traits;

// Re-export public API
pub use queue::WaitQueue;
pub use traits::{WaitOutcome, WaitStrategy, WakeResult};

// Re-export specific strategies for advanced users
pub use condvar::CondvarWait;
pub use futex::FutexWait;
pub use spinwait::SpinWait;
