/*!
 * Per-Unit Slots and Pinned Regions
 */

use crate::core::errors::{RwSemError, RwSemResult};
use crate::core::limits::{DEFAULT_BARRIER_SPINS, PIN_PROBE_ROUNDS};
use crate::core::topology::Topology;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::atomic::{fence, AtomicU64, AtomicUsize, Ordering};
use std::thread;

/// Source of per-thread home-unit tickets
static NEXT_TICKET: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static HOME_TICKET: usize = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
}

/// Round-robin ticket of the calling thread, stable for its lifetime
#[inline]
fn home_ticket() -> usize {
    // Thread-local storage is gone during thread teardown; any unit works then
    HOME_TICKET.try_with(|ticket| *ticket).unwrap_or(0)
}

/// A single execution unit
#[repr(C, align(64))] // Cache-line aligned to prevent false sharing
pub(super) struct Unit<T> {
    /// Even = idle, odd = pinned
    pub(super) seq: AtomicU64,
    pub(super) value: T,
}

// `align(64)` above is a literal; keep it in step with the topology constant
const _: () = assert!(std::mem::align_of::<Unit<()>>() == Topology::cache_line_size());

/// Per-execution-unit storage
///
/// # Performance
///
/// - **Pin**: one uncontended CAS on the caller's own cache line plus a fence
/// - **Home units**: threads are spread round-robin, so two threads only
///   share a unit when there are more threads than units
/// - **Barrier**: O(units), blocks only on units pinned at call time
///
/// # Example
///
/// ```
/// use biased_rwsem::core::sync::percpu::PerCpu;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// let hits = PerCpu::try_new(4, |_| AtomicU64::new(0)).unwrap();
/// {
///     let unit = hits.pin();
///     unit.store(unit.load(Ordering::Relaxed) + 1, Ordering::Relaxed);
/// }
/// hits.synchronize();
/// let total: u64 = hits.iter().map(|h| h.load(Ordering::Relaxed)).sum();
/// assert_eq!(total, 1);
/// ```
pub struct PerCpu<T> {
    pub(super) units: Box<[Unit<T>]>,
    pub(super) barrier_spins: u32,
}

impl<T> PerCpu<T> {
    /// Allocate `units` slots, initializing slot `i` with `init(i)`
    ///
    /// Allocation is fallible: an exhausted allocator yields
    /// `RwSemError::AllocationFailed` instead of aborting.
    pub fn try_new<F>(units: usize, mut init: F) -> RwSemResult<Self>
    where
        F: FnMut(usize) -> T,
    {
        if units == 0 {
            return Err(RwSemError::InvalidConfig(
                "at least one execution unit is required".into(),
            ));
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(units)
            .map_err(|_| RwSemError::AllocationFailed { units })?;
        for index in 0..units {
            slots.push(Unit {
                seq: AtomicU64::new(0),
                value: init(index),
            });
        }

        Ok(Self {
            units: slots.into_boxed_slice(),
            barrier_spins: DEFAULT_BARRIER_SPINS,
        })
    }

    /// Busy polls per pinned unit before `synchronize` starts yielding
    pub fn with_barrier_spins(mut self, spins: u32) -> Self {
        self.barrier_spins = spins.max(1);
        self
    }

    /// Number of execution units
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Always false: construction rejects zero units
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Enter a pinned region on one execution unit
    ///
    /// Prefers the calling thread's home unit and probes the others when it
    /// is occupied. The region lasts until the returned guard drops; it must
    /// not block, and the same thread must not call `synchronize` on this
    /// `PerCpu` while pinned. Pinning a second time from the same thread
    /// needs a second free unit.
    ///
    /// Costs a CAS on the unit's own line plus a full fence. When every unit
    /// is busy for `PIN_PROBE_ROUNDS` sweeps, which only happens with more
    /// threads than units, the caller yields its time slice.
    #[inline]
    pub fn pin(&self) -> Pinned<'_, T> {
        let len = self.units.len();
        let home = home_ticket() % len;
        let mut index = home;
        let mut rounds = 0u32;

        loop {
            let unit = &self.units[index];
            let seq = unit.seq.load(Ordering::Relaxed);
            if seq & 1 == 0
                && unit
                    .seq
                    .compare_exchange_weak(
                        seq,
                        seq.wrapping_add(1),
                        Ordering::SeqCst,
                        Ordering::Relaxed,
                    )
                    .is_ok()
            {
                // Pairs with the fences in `synchronize`
                fence(Ordering::SeqCst);
                return Pinned {
                    unit,
                    index,
                    seq: seq.wrapping_add(1),
                    _not_send: PhantomData,
                };
            }

            index += 1;
            if index == len {
                index = 0;
            }
            if index == home {
                rounds += 1;
                if rounds < PIN_PROBE_ROUNDS {
                    std::hint::spin_loop();
                } else {
                    thread::yield_now();
                }
            }
        }
    }

    /// Visit every slot
    ///
    /// Values of units pinned by other threads may change underneath; call
    /// `synchronize` first when a stable view is required.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.units.iter().map(|unit| &unit.value)
    }

    /// Number of units pinned right now (diagnostic, racy)
    pub fn pinned_count(&self) -> usize {
        self.units
            .iter()
            .filter(|unit| unit.seq.load(Ordering::Relaxed) & 1 == 1)
            .count()
    }
}

impl<T> std::fmt::Debug for PerCpu<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerCpu")
            .field("units", &self.units.len())
            .field("pinned", &self.pinned_count())
            .finish()
    }
}

/// Guard for a pinned region
///
/// Dereferences to the slot of the occupied unit. `!Send`: the region
/// belongs to the thread that entered it.
pub struct Pinned<'a, T> {
    unit: &'a Unit<T>,
    index: usize,
    seq: u64,
    _not_send: PhantomData<*const ()>,
}

impl<T> Pinned<'_, T> {
    /// Index of the occupied unit
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Deref for Pinned<'_, T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        &self.unit.value
    }
}

impl<T> Drop for Pinned<'_, T> {
    #[inline]
    fn drop(&mut self) {
        // Publishes every slot update made inside the region
        self.unit
            .seq
            .store(self.seq.wrapping_add(1), Ordering::Release);
    }
}
