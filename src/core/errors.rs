/*!
 * Error Types
 * Construction errors for the biased reader-writer lock, with thiserror,
 * miette and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for fallible lock construction
pub type RwSemResult<T> = Result<T, RwSemError>;

/// Errors raised while building a lock
///
/// Steady-state acquire/release paths never fail; only construction does.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum RwSemError {
    #[error("Failed to allocate counters for {units} execution units")]
    #[diagnostic(
        code(rwsem::allocation_failed),
        help("The system is low on memory. Retry construction or request fewer execution units.")
    )]
    AllocationFailed { units: usize },

    #[error("Invalid lock configuration: {0}")]
    #[diagnostic(
        code(rwsem::invalid_config),
        help("At least one execution unit is required and spin budgets must be non-zero.")
    )]
    InvalidConfig(String),
}
