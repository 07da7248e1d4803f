/*!
 * Synchronization Traits
 *
 * Core abstraction for the single-condition wait/notify pattern used by the
 * writer side of the lock.
 *
 * # Design: Condition Checked Inside the Strategy
 *
 * A waiter hands its condition to the strategy instead of checking it before
 * calling `wait`. Each strategy re-evaluates the condition under whatever
 * lock its waker also takes, which is what rules out lost wake-ups.
 */

/// Result of a wake operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    /// Check if any waiters were woken
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }
}

/// How a `wait_until` call completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Condition already held, the caller never blocked
    Ready,
    /// Caller blocked (spun, yielded or parked) at least once
    Waited,
}

impl WaitOutcome {
    #[inline(always)]
    pub fn waited(&self) -> bool {
        matches!(self, WaitOutcome::Waited)
    }
}

/// Strategy for blocking until a condition holds
///
/// Implementations must be:
/// - **Thread-safe**: waiters and wakers run on arbitrary threads
/// - **Lost-wakeup free**: if the waker makes `cond` true and then calls
///   `wake_all`, a waiter that saw `cond` false is always released
/// - **Spurious-tolerant**: `wake_all` with `cond` still false only costs a
///   re-check
pub trait WaitStrategy: Send + Sync {
    /// Block until `cond` returns `true`
    ///
    /// `cond` must read shared state with `SeqCst` loads; the waiter-count
    /// handshake with `wake_all` relies on it.
    fn wait_until(&self, cond: &dyn Fn() -> bool) -> WaitOutcome;

    /// Wake every waiter so it re-evaluates its condition
    fn wake_all(&self) -> WakeResult;

    /// Approximate count of blocked waiters (for diagnostics)
    fn waiter_count(&self) -> usize {
        0
    }

    /// Get strategy name for debugging
    fn name(&self) -> &'static str;
}
