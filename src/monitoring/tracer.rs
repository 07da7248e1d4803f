/*!
 * Structured Tracing
 * Subscriber setup and timed phase spans using the tracing crate
 */

use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Phases slower than this are reported at warn level
const SLOW_PHASE: Duration = Duration::from_secs(1);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - RWSEM_TRACE_JSON: Enable JSON output (default: false)
///
/// A second call is a no-op.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RWSEM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        // JSON output for production/parsing
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        // Human-readable output for development
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Timed span around one phase of work
///
/// Logs the duration on drop, at warn level when the phase was slow.
pub struct PhaseSpan {
    span: tracing::Span,
    start: Instant,
    phase: &'static str,
}

impl PhaseSpan {
    pub fn new(phase: &'static str) -> Self {
        let span = span!(
            Level::DEBUG,
            "phase",
            phase = phase,
            duration_ms = tracing::field::Empty,
            items_processed = tracing::field::Empty,
        );

        debug!(parent: &span, phase, "phase started");

        Self {
            span,
            start: Instant::now(),
            phase,
        }
    }

    /// Record how many items the phase handled
    pub fn record_items(&self, count: u64) {
        self.span.record("items_processed", count);
    }

    /// Time since the phase started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PhaseSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let duration_ms = duration.as_millis() as u64;
        self.span.record("duration_ms", duration_ms);

        if duration > SLOW_PHASE {
            warn!(parent: &self.span, phase = self.phase, duration_ms, slow = true, "phase completed");
        } else {
            debug!(parent: &self.span, phase = self.phase, duration_ms, "phase completed");
        }
    }
}
