/*!
 * Adaptive Spin-Wait Strategy
 *
 * For writers whose readers usually leave within microseconds. Spins, then
 * yields, then parks on a condvar.
 */

use super::condvar::CondvarWait;
use super::traits::{WaitOutcome, WaitStrategy, WakeResult};
use crate::core::limits::{DEFAULT_MAX_SPINS, DEFAULT_SPIN_DURATION};
use std::thread;
use std::time::{Duration, Instant};

/// Number of tight `spin_loop` iterations before yielding
const TIGHT_SPINS: u32 = 10;

/// Adaptive spin-wait strategy
///
/// # Performance
///
/// - Ultra-low latency for short waits (< 10µs)
/// - Higher CPU usage during wait
/// - Falls back to condvar for long waits
pub struct SpinWait {
    /// Fallback condvar for long waits
    fallback: CondvarWait,
    /// Spin duration before falling back
    spin_duration: Duration,
    /// Maximum spin iterations
    max_spins: u32,
}

impl SpinWait {
    /// Create a new adaptive spin-wait strategy
    pub fn new(spin_duration: Duration, max_spins: u32) -> Self {
        Self {
            fallback: CondvarWait::new(),
            spin_duration,
            max_spins,
        }
    }

    /// Create with default parameters
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_SPIN_DURATION, DEFAULT_MAX_SPINS)
    }

    /// Spin and yield until `cond` holds or the budget runs out
    ///
    /// Returns true if the condition was observed.
    fn spin(&self, cond: &dyn Fn() -> bool) -> bool {
        let start = Instant::now();
        let mut spin_count = 0u32;

        loop {
            if cond() {
                return true;
            }

            if start.elapsed() >= self.spin_duration || spin_count >= self.max_spins {
                return false;
            }

            if spin_count < TIGHT_SPINS {
                std::hint::spin_loop();
            } else {
                thread::yield_now();
            }

            spin_count += 1;
        }
    }
}

impl Default for SpinWait {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl WaitStrategy for SpinWait {
    fn wait_until(&self, cond: &dyn Fn() -> bool) -> WaitOutcome {
        if cond() {
            return WaitOutcome::Ready;
        }

        if !self.spin(cond) {
            self.fallback.wait_until(cond);
        }
        WaitOutcome::Waited
    }

    fn wake_all(&self) -> WakeResult {
        // Spinners poll the condition themselves; only parked waiters need it
        self.fallback.wake_all()
    }

    fn waiter_count(&self) -> usize {
        self.fallback.waiter_count()
    }

    fn name(&self) -> &'static str {
        "spinwait"
    }
}
