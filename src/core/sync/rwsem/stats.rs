/*!
 * Lock Statistics
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Snapshot of lock activity
///
/// Counters are read without stopping the lock, so a snapshot taken under
/// load is only approximately consistent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockStats {
    /// Execution units (fast counter slots)
    pub units: usize,
    /// Read acquisitions that took the fast path
    pub fast_reads: u64,
    /// Read acquisitions that took the slow path
    pub slow_reads: u64,
    /// Completed write acquisitions
    pub writes: u64,
    /// Write acquisitions that had to block for readers to drain
    pub writer_waits: u64,
    /// Quiescence barriers issued
    pub barriers: u64,
    /// Fast counter sum moved into the slow counter by the latest writer
    pub last_drained: i64,
    /// Fast counter sum plus slow counter at snapshot time
    pub active_readers: i64,
}

impl LockStats {
    /// Total read acquisitions
    pub fn reads(&self) -> u64 {
        self.fast_reads + self.slow_reads
    }

    /// Share of reads served by the fast path, 1.0 when there were none
    pub fn fast_path_ratio(&self) -> f64 {
        let reads = self.reads();
        if reads == 0 {
            1.0
        } else {
            self.fast_reads as f64 / reads as f64
        }
    }
}

/// Slow-path counters, only touched off the fast path
#[derive(Debug, Default)]
pub(super) struct SlowPathStats {
    pub(super) slow_reads: AtomicU64,
    pub(super) writes: AtomicU64,
    pub(super) writer_waits: AtomicU64,
    pub(super) barriers: AtomicU64,
    pub(super) last_drained: AtomicI64,
}

impl SlowPathStats {
    #[inline]
    pub(super) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fast_path_ratio() {
        let stats = LockStats {
            fast_reads: 3,
            slow_reads: 1,
            ..Default::default()
        };
        assert_eq!(stats.reads(), 4);
        assert!((stats.fast_path_ratio() - 0.75).abs() < f64::EPSILON);
        assert_eq!(LockStats::default().fast_path_ratio(), 1.0);
    }

    #[test]
    fn test_stats_json() {
        let stats = LockStats {
            units: 4,
            writes: 2,
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        let back: LockStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
