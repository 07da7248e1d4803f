/*!
 * Core Module
 * Synchronization primitives, limits and error handling
 */

pub mod errors;
pub mod hints;
pub mod limits;
pub mod sync;
pub mod topology;

// Re-export for convenience
pub use errors::*;
pub use topology::Topology;
