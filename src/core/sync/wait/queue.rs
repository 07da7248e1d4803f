/*!
 * Wait Queue
 *
 * Single-condition wait queue (`wait_event` / `wake_up_all`). The strategy
 * is selected once from the configuration.
 */

use super::condvar::CondvarWait;
use super::futex::FutexWait;
use super::spinwait::SpinWait;
use super::traits::{WaitOutcome, WaitStrategy, WakeResult};
use crate::core::sync::config::{StrategyType, SyncConfig};

/// Blocking wait queue
///
/// # Examples
///
/// ```
/// use biased_rwsem::core::sync::{SyncConfig, WaitQueue};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// let queue = WaitQueue::new(&SyncConfig::default());
/// let done = AtomicBool::new(true);
///
/// // Condition already holds: returns without blocking
/// queue.wait_until(|| done.load(Ordering::SeqCst));
/// queue.wake_all();
/// ```
pub struct WaitQueue {
    strategy: Box<dyn WaitStrategy>,
}

impl WaitQueue {
    /// Create a new wait queue with the specified configuration
    pub fn new(config: &SyncConfig) -> Self {
        let strategy: Box<dyn WaitStrategy> = match config.select_strategy() {
            StrategyType::Futex => Box::new(FutexWait::new()),
            StrategyType::Condvar => Box::new(CondvarWait::new()),
            StrategyType::SpinWait => {
                Box::new(SpinWait::new(config.spin_duration, config.max_spins))
            }
            StrategyType::Auto => unreachable!("select_strategy resolves Auto"),
        };

        Self { strategy }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(&SyncConfig::default())
    }

    /// Block until `cond` holds
    ///
    /// The condition is checked before blocking and after every wake, so a
    /// spurious `wake_all` only costs a re-check.
    #[inline]
    pub fn wait_until<F>(&self, cond: F) -> WaitOutcome
    where
        F: Fn() -> bool,
    {
        self.strategy.wait_until(&cond)
    }

    /// Wake every waiter
    #[inline]
    pub fn wake_all(&self) -> WakeResult {
        self.strategy.wake_all()
    }

    /// Get approximate count of blocked waiters (for diagnostics)
    pub fn waiter_count(&self) -> usize {
        self.strategy.waiter_count()
    }

    /// Get the name of the active strategy
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }
}

impl Default for WaitQueue {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for WaitQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitQueue")
            .field("strategy", &self.strategy.name())
            .field("waiters", &self.strategy.waiter_count())
            .finish()
    }
}
