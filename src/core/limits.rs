/*!
 * Lock Limits and Constants
 *
 * Centralized location for the tunables of the biased reader-writer lock:
 * execution-unit bounds, spin budgets and barrier polling.
 *
 * - Performance-critical constants are marked with [PERF]
 * - Linux-compatible values are marked with [LINUX-COMPAT]
 */

use std::time::Duration;

// =============================================================================
// EXECUTION UNITS
// =============================================================================

/// Upper bound on execution units per lock
/// [LINUX-COMPAT] Matches the common NR_CPUS ceiling for distro kernels
pub const MAX_EXECUTION_UNITS: usize = 8192;

/// Fallback when the CPU count cannot be detected
pub const FALLBACK_CPU_COUNT: usize = 8;

/// Cache line size used for per-unit slot alignment
/// [PERF] x86-64, ARM64 and RISC-V all use 64-byte lines
pub const CACHE_LINE_SIZE: usize = 64;

// =============================================================================
// QUIESCENCE BARRIER
// =============================================================================

/// Busy polls of a pinned unit before the barrier starts yielding
/// [PERF] Pinned regions are a handful of instructions, most finish while spinning
pub const DEFAULT_BARRIER_SPINS: u32 = 128;

/// Full sweeps over busy units before `pin()` yields its time slice
pub const PIN_PROBE_ROUNDS: u32 = 4;

// =============================================================================
// WAIT QUEUE
// =============================================================================

/// Default spin duration before a spin-waiter parks
pub const DEFAULT_SPIN_DURATION: Duration = Duration::from_micros(10);

/// Default spin iterations before a spin-waiter starts yielding
pub const DEFAULT_MAX_SPINS: u32 = 100;

// =============================================================================
// STRESS HARNESS
// =============================================================================

/// Reader threads in the default stress scenario
pub const STRESS_THREADS: usize = 8;

/// Read cycles per reader thread in the default stress scenario
pub const STRESS_ITERATIONS: usize = 10_000;

/// A writer cycle is issued every this many read cycles
pub const STRESS_WRITE_EVERY: usize = 100;

/// Upper bound on stress reader threads
pub const STRESS_MAX_THREADS: usize = 1024;

/// Upper bound on interleave log entries (one byte each)
pub const STRESS_MAX_LOG_EVENTS: usize = 1 << 28;
