/*!
 * Synchronization Configuration
 *
 * Construction-time configuration for the biased lock: execution unit count,
 * writer wait strategy and spin budgets
 */

use crate::core::errors::{RwSemError, RwSemResult};
use crate::core::limits::{DEFAULT_BARRIER_SPINS, DEFAULT_MAX_SPINS, DEFAULT_SPIN_DURATION};
use crate::core::topology::Topology;
use std::time::Duration;

/// Strategy type selection for the writer wait queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyType {
    /// Parking-lot futex emulation (fastest on Linux)
    Futex,
    /// Mutex + condvar (cross-platform, reliable)
    Condvar,
    /// Adaptive spinwait (low-latency, high-CPU for short waits)
    SpinWait,
    /// Auto-select based on platform
    Auto,
}

impl std::str::FromStr for StrategyType {
    type Err = RwSemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "futex" => Ok(Self::Futex),
            "condvar" => Ok(Self::Condvar),
            "spin" | "spinwait" => Ok(Self::SpinWait),
            "auto" => Ok(Self::Auto),
            other => Err(RwSemError::InvalidConfig(format!(
                "unknown wait strategy '{}'",
                other
            ))),
        }
    }
}

/// Lock configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Execution units (fast counter slots); `None` = one per CPU
    pub units: Option<usize>,
    /// Preferred writer wait strategy
    pub strategy: StrategyType,
    /// Spin duration before parking (for SpinWait)
    pub spin_duration: Duration,
    /// Maximum spin iterations before yielding (for SpinWait)
    pub max_spins: u32,
    /// Busy polls per pinned unit before the quiescence barrier yields
    pub barrier_spins: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            units: None,
            strategy: StrategyType::Auto,
            spin_duration: DEFAULT_SPIN_DURATION,
            max_spins: DEFAULT_MAX_SPINS,
            barrier_spins: DEFAULT_BARRIER_SPINS,
        }
    }
}

impl SyncConfig {
    /// Configuration for writers that expect readers to drain quickly
    pub const fn low_latency() -> Self {
        Self {
            units: None,
            strategy: StrategyType::SpinWait,
            spin_duration: Duration::from_micros(50),
            max_spins: 500,
            barrier_spins: 1024,
        }
    }

    /// Configuration for long reader critical sections
    pub const fn long_wait() -> Self {
        Self {
            units: None,
            strategy: StrategyType::Auto,
            spin_duration: Duration::from_micros(1),
            max_spins: 10,
            barrier_spins: 16,
        }
    }

    /// Override the execution unit count
    pub fn with_units(mut self, units: usize) -> Self {
        self.units = Some(units);
        self
    }

    /// Override the wait strategy
    pub fn with_strategy(mut self, strategy: StrategyType) -> Self {
        self.strategy = strategy;
        self
    }

    /// Select best strategy for current platform
    pub fn select_strategy(&self) -> StrategyType {
        match self.strategy {
            StrategyType::Auto => {
                #[cfg(target_os = "linux")]
                {
                    StrategyType::Futex
                }
                #[cfg(not(target_os = "linux"))]
                {
                    StrategyType::Condvar
                }
            }
            other => other,
        }
    }

    /// Execution unit count after applying topology defaults
    pub fn resolved_units(&self) -> usize {
        Topology::execution_units(self.units)
    }

    /// Reject configurations the lock cannot be built from
    pub fn validate(&self) -> RwSemResult<()> {
        if self.resolved_units() == 0 {
            return Err(RwSemError::InvalidConfig(
                "at least one execution unit is required".into(),
            ));
        }
        if self.barrier_spins == 0 {
            return Err(RwSemError::InvalidConfig(
                "barrier_spins must be greater than zero".into(),
            ));
        }
        if self.select_strategy() == StrategyType::SpinWait && self.max_spins == 0 {
            return Err(RwSemError::InvalidConfig(
                "max_spins must be greater than zero for the spinwait strategy".into(),
            ));
        }
        Ok(())
    }
}
