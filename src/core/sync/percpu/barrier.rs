/*!
 * Quiescence Barrier
 *
 * `synchronize_sched()` for pinned regions. After `synchronize` returns:
 *
 * 1. every region that starts later observes all stores the caller made
 *    before the call (fence-to-fence ordering with `pin`)
 * 2. every region that was in progress at the call has ended, and the
 *    caller observes everything it wrote (acquire on the unpin store)
 */

use super::slots::PerCpu;
use std::sync::atomic::{fence, Ordering};
use std::thread;
use tracing::trace;

impl<T> PerCpu<T> {
    /// Wait until every region pinned at call time has ended
    ///
    /// Must not be called while the calling thread holds a `Pinned` from
    /// this `PerCpu`.
    pub fn synchronize(&self) {
        // Either a concurrent pin's fence precedes this one, and we see its
        // odd sequence below, or it follows, and its region sees our stores.
        fence(Ordering::SeqCst);

        let mut waited_units = 0usize;
        for unit in self.units.iter() {
            let seq = unit.seq.load(Ordering::Acquire);
            if seq & 1 == 0 {
                continue;
            }

            waited_units += 1;
            let mut polls = 0u32;
            while unit.seq.load(Ordering::Acquire) == seq {
                if polls < self.barrier_spins {
                    std::hint::spin_loop();
                    polls += 1;
                } else {
                    thread::yield_now();
                }
            }
        }

        fence(Ordering::SeqCst);

        if waited_units > 0 {
            trace!(waited_units, units = self.units.len(), "Quiescence barrier waited on pinned units");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::sync::percpu::PerCpu;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_synchronize_idle_returns() {
        let slots = PerCpu::try_new(4, |_| ()).unwrap();
        slots.synchronize();
        slots.synchronize();
    }

    #[test]
    fn test_synchronize_waits_for_pinned_region() {
        let slots = Arc::new(PerCpu::try_new(2, |_| ()).unwrap().with_barrier_spins(4));
        let region_done = Arc::new(AtomicBool::new(false));
        let pinned = Arc::new(Barrier::new(2));

        let handle = {
            let slots = slots.clone();
            let region_done = region_done.clone();
            let pinned = pinned.clone();
            thread::spawn(move || {
                let guard = slots.pin();
                pinned.wait();
                thread::sleep(Duration::from_millis(50));
                region_done.store(true, Ordering::SeqCst);
                drop(guard);
            })
        };

        pinned.wait();
        slots.synchronize();
        assert!(region_done.load(Ordering::SeqCst));

        handle.join().unwrap();
    }

    #[test]
    fn test_synchronize_not_starved_by_new_regions() {
        let slots = Arc::new(PerCpu::try_new(1, |_| AtomicUsize::new(0)).unwrap());
        let stop = Arc::new(AtomicBool::new(false));

        let churn: Vec<_> = (0..4)
            .map(|_| {
                let slots = slots.clone();
                let stop = stop.clone();
                thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        let unit = slots.pin();
                        unit.store(unit.load(Ordering::Relaxed) + 1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for _ in 0..100 {
            slots.synchronize();
        }

        stop.store(true, Ordering::Relaxed);
        for handle in churn {
            handle.join().unwrap();
        }
    }
}
