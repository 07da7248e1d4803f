/*!
 * RAII Guards
 *
 * Scoped wrappers over the raw acquire/release operations
 */

use super::lock::BiasedRwLock;
use std::marker::PhantomData;

/// Read access held until drop
///
/// `Send`: a reader may release on another thread, the per-unit counters
/// are summed rather than owned.
#[must_use = "dropping the guard releases read access immediately"]
#[derive(Debug)]
pub struct ReadGuard<'a> {
    lock: &'a BiasedRwLock,
}

impl<'a> ReadGuard<'a> {
    #[inline]
    pub(super) fn new(lock: &'a BiasedRwLock) -> Self {
        Self { lock }
    }

    /// The lock this guard belongs to
    pub fn lock(&self) -> &'a BiasedRwLock {
        self.lock
    }
}

impl Drop for ReadGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// Exclusive access held until drop
///
/// `!Send`: the writer lock has to be released by the thread that took it.
#[must_use = "dropping the guard releases exclusive access immediately"]
#[derive(Debug)]
pub struct WriteGuard<'a> {
    lock: &'a BiasedRwLock,
    _not_send: PhantomData<*const ()>,
}

impl<'a> WriteGuard<'a> {
    #[inline]
    pub(super) fn new(lock: &'a BiasedRwLock) -> Self {
        Self {
            lock,
            _not_send: PhantomData,
        }
    }

    /// The lock this guard belongs to
    pub fn lock(&self) -> &'a BiasedRwLock {
        self.lock
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard is only built right after `acquire_write` on this
        // thread and cannot leave it
        unsafe { self.lock.release_write() };
    }
}
