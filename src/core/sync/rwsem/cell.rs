/*!
 * Biased RwLock Cell
 *
 * Data-carrying wrapper: a value protected by a `BiasedRwLock`
 */

use super::guard::{ReadGuard, WriteGuard};
use super::lock::BiasedRwLock;
use crate::core::errors::RwSemResult;
use crate::core::sync::config::SyncConfig;
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

/// Value protected by a biased reader-writer lock
///
/// # Example
///
/// ```
/// use biased_rwsem::BiasedRwCell;
///
/// let routes = BiasedRwCell::new(vec!["eth0"]).unwrap();
/// routes.write().push("eth1");
/// assert_eq!(routes.read().len(), 2);
/// ```
pub struct BiasedRwCell<T> {
    lock: BiasedRwLock,
    data: UnsafeCell<T>,
}

// SAFETY: the lock hands out `&T` to readers and `&mut T` to a single writer
unsafe impl<T: Send> Send for BiasedRwCell<T> {}
unsafe impl<T: Send + Sync> Sync for BiasedRwCell<T> {}

impl<T> BiasedRwCell<T> {
    /// Wrap `value` with the default lock configuration
    pub fn new(value: T) -> RwSemResult<Self> {
        Self::with_config(value, SyncConfig::default())
    }

    /// Wrap `value` with an explicit lock configuration
    pub fn with_config(value: T, config: SyncConfig) -> RwSemResult<Self> {
        Ok(Self {
            lock: BiasedRwLock::with_config(config)?,
            data: UnsafeCell::new(value),
        })
    }

    /// Shared access
    #[inline]
    pub fn read(&self) -> CellReadGuard<'_, T> {
        let guard = self.lock.read();
        CellReadGuard {
            _guard: guard,
            // SAFETY: read access excludes writers until the guard drops
            data: unsafe { &*self.data.get() },
        }
    }

    /// Exclusive access
    pub fn write(&self) -> CellWriteGuard<'_, T> {
        let guard = self.lock.write();
        CellWriteGuard {
            _guard: guard,
            data: self.data.get(),
            _cell: std::marker::PhantomData,
        }
    }

    /// Mutable access without locking, `&mut self` proves exclusivity
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Consume the cell and return the value
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }

    /// The underlying lock, for statistics
    pub fn raw(&self) -> &BiasedRwLock {
        &self.lock
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for BiasedRwCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiasedRwCell")
            .field("data", &&*self.read())
            .finish()
    }
}

/// Shared access to a `BiasedRwCell` value
pub struct CellReadGuard<'a, T> {
    _guard: ReadGuard<'a>,
    data: &'a T,
}

impl<T> Deref for CellReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.data
    }
}

/// Exclusive access to a `BiasedRwCell` value
pub struct CellWriteGuard<'a, T> {
    _guard: WriteGuard<'a>,
    data: *mut T,
    _cell: std::marker::PhantomData<&'a mut T>,
}

impl<T> Deref for CellWriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: exclusive access held until `_guard` drops
        unsafe { &*self.data }
    }
}

impl<T> DerefMut for CellWriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: exclusive access held until `_guard` drops
        unsafe { &mut *self.data }
    }
}
