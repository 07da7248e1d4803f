/*!
 * Condvar-Based Wait Strategy
 *
 * Cross-platform fallback using parking_lot::Condvar.
 *
 * The waiter evaluates its condition while holding the mutex, and the waker
 * takes the same mutex before notifying. A waker that flips the condition
 * after the waiter's check therefore cannot notify until the waiter is
 * already parked on the condvar.
 */

use super::traits::{WaitOutcome, WaitStrategy, WakeResult};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Condvar-based wait strategy
#[repr(C, align(64))] // Cache-line aligned to prevent false sharing
pub struct CondvarWait {
    condvar: Condvar,
    mutex: Mutex<()>,
    waiters: AtomicUsize,
}

impl CondvarWait {
    /// Create a new condvar-based wait strategy
    pub const fn new() -> Self {
        Self {
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
            waiters: AtomicUsize::new(0),
        }
    }
}

impl Default for CondvarWait {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitStrategy for CondvarWait {
    fn wait_until(&self, cond: &dyn Fn() -> bool) -> WaitOutcome {
        // Publish ourselves before the first check so a waker that misses the
        // check still sees a waiter and takes the mutex.
        self.waiters.fetch_add(1, Ordering::SeqCst);

        let mut guard = self.mutex.lock();
        let mut outcome = WaitOutcome::Ready;
        while !cond() {
            outcome = WaitOutcome::Waited;
            self.condvar.wait(&mut guard);
        }
        drop(guard);

        self.waiters.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    fn wake_all(&self) -> WakeResult {
        let count = self.waiters.load(Ordering::SeqCst);
        if count == 0 {
            return WakeResult::NoWaiters;
        }

        // Serialize with the waiter's check-then-park
        let _guard = self.mutex.lock();
        let woken = self.condvar.notify_all();
        if woken == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(woken)
        }
    }

    fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::Relaxed)
    }

    fn name(&self) -> &'static str {
        "condvar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_condvar_ready_without_blocking() {
        let cv = CondvarWait::new();
        assert_eq!(cv.wait_until(&|| true), WaitOutcome::Ready);
        assert_eq!(cv.waiter_count(), 0);
    }

    #[test]
    fn test_condvar_wake_all() {
        let cv = Arc::new(CondvarWait::new());
        let flag = Arc::new(AtomicBool::new(false));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let cv = cv.clone();
                let flag = flag.clone();
                thread::spawn(move || cv.wait_until(&|| flag.load(Ordering::SeqCst)))
            })
            .collect();

        // Give threads time to wait
        thread::sleep(Duration::from_millis(100));

        flag.store(true, Ordering::SeqCst);
        let result = cv.wake_all();
        assert!(result.count() <= 3);

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cv.waiter_count(), 0);
    }

    #[test]
    fn test_condvar_no_waiters() {
        let cv = CondvarWait::new();
        assert_eq!(cv.wake_all(), WakeResult::NoWaiters);
    }
}
