/*!
 * Monitoring
 * Structured tracing setup and timed phases
 */

mod tracer;

pub use tracer::{init_tracing, PhaseSpan};
