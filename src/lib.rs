/*!
 * Biased Reader-Writer Semaphore
 * Percpu reader counters, a quiescence barrier, and a slow path for rare writers
 */

pub mod core;
pub mod monitoring;
pub mod stress;

// Re-exports
pub use crate::core::errors::{RwSemError, RwSemResult};
pub use crate::core::sync::{
    BiasedRwCell, BiasedRwLock, LockStats, ReadGuard, StrategyType, SyncConfig, WriteGuard,
};
pub use crate::core::Topology;
pub use monitoring::init_tracing;
pub use stress::{run_stress, StressConfig, StressReport};
