/*!
 * Futex-Based Wait Strategy
 *
 * Uses parking_lot_core for futex-like operations on all platforms.
 *
 * # Design
 *
 * The queue's own address is the parking key. `park` runs the validate
 * callback under the parking bucket lock and `unpark_all` takes the same
 * bucket lock, so a condition flipped before `wake_all` is either seen by
 * the validate callback (no park) or the waiter is already queued (woken).
 */

use super::traits::{WaitOutcome, WaitStrategy, WakeResult};
use parking_lot_core::{park, unpark_all, ParkResult, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Futex-based wait strategy
#[repr(C, align(64))]
pub struct FutexWait {
    waiters: AtomicUsize,
}

impl FutexWait {
    /// Create a new futex-based wait strategy
    pub const fn new() -> Self {
        Self {
            waiters: AtomicUsize::new(0),
        }
    }

    /// Stable parking address
    #[inline]
    fn key(&self) -> usize {
        &self.waiters as *const AtomicUsize as usize
    }
}

impl Default for FutexWait {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitStrategy for FutexWait {
    fn wait_until(&self, cond: &dyn Fn() -> bool) -> WaitOutcome {
        if cond() {
            return WaitOutcome::Ready;
        }

        self.waiters.fetch_add(1, Ordering::SeqCst);
        let key = self.key();

        while !cond() {
            // SAFETY: the key is the address of a field we own, and none of
            // the callbacks call back into parking_lot.
            let result = unsafe {
                park(
                    key,
                    || !cond(),
                    || {},
                    |_, _| {},
                    DEFAULT_PARK_TOKEN,
                    None,
                )
            };
            if let ParkResult::TimedOut = result {
                unreachable!("park without deadline cannot time out");
            }
        }

        self.waiters.fetch_sub(1, Ordering::SeqCst);
        WaitOutcome::Waited
    }

    fn wake_all(&self) -> WakeResult {
        if self.waiters.load(Ordering::SeqCst) == 0 {
            return WakeResult::NoWaiters;
        }

        // SAFETY: same key as `wait_until`, no callbacks
        let unparked = unsafe { unpark_all(self.key(), DEFAULT_UNPARK_TOKEN) };
        if unparked == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(unparked)
        }
    }

    fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::Relaxed)
    }

    fn name(&self) -> &'static str {
        "futex"
    }
}
