/*!
 * Execution Unit Topology
 *
 * Decides how many per-unit counter slots a lock gets. One slot per CPU keeps
 * home-unit collisions rare without paying for slots nobody can occupy.
 *
 * # Design: Pure Functions Over Singleton
 *
 * `available_parallelism` is cheap enough to call at lock construction, so
 * there is no cached global here.
 */

use crate::core::limits::{CACHE_LINE_SIZE, FALLBACK_CPU_COUNT, MAX_EXECUTION_UNITS};
use tracing::warn;

/// Hardware topology queries (pure functions)
pub struct Topology;

impl Topology {
    /// Number of CPUs available to this process
    #[inline]
    pub fn cpu_count() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or_else(|err| {
                warn!(
                    error = %err,
                    fallback = FALLBACK_CPU_COUNT,
                    "Failed to detect CPU count"
                );
                FALLBACK_CPU_COUNT
            })
    }

    /// Cache line size used to pad per-unit slots
    #[inline(always)]
    pub const fn cache_line_size() -> usize {
        CACHE_LINE_SIZE
    }

    /// Resolve the execution unit count for a lock
    ///
    /// `None` means one unit per CPU. Explicit requests are clamped to
    /// `MAX_EXECUTION_UNITS`; zero is passed through so config validation can
    /// reject it.
    #[inline]
    pub fn execution_units(requested: Option<usize>) -> usize {
        match requested {
            Some(units) => units.min(MAX_EXECUTION_UNITS),
            None => Self::cpu_count().clamp(1, MAX_EXECUTION_UNITS),
        }
    }
}
