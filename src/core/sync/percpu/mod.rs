/*!
 * Per-Execution-Unit Storage
 *
 * User-space stand-ins for the kernel's per-CPU variables, preempt-disabled
 * regions and `synchronize_sched()`:
 *
 * - `PerCpu<T>`: one cache-line aligned slot per execution unit
 * - `Pinned`: a scoped region during which the calling thread is the only
 *   occupant of one unit, so the slot can be updated without RMW atomics
 * - `PerCpu::synchronize`: the quiescence barrier, waits out every region
 *   in progress when it is called
 *
 * # Unit Sequence Numbers
 *
 * Each unit carries a sequence number: even = idle, odd = pinned. Pinning
 * is a CAS from even to odd, unpinning a release store of the next even
 * value. Every odd value belongs to exactly one region, so the barrier
 * only has to see the value change and cannot be starved by a stream of
 * new regions.
 */

mod barrier;
mod slots;

pub use slots::{PerCpu, Pinned};
