/*!
 * rwsem-stress - Round-Trip Stress Entry Point
 *
 * Runs reader threads against one rare writer and checks that no reader ever
 * overlaps the writer. Configuration comes from the environment:
 * - RWSEM_THREADS: reader threads (default 8)
 * - RWSEM_ITERATIONS: read cycles per thread (default 10000)
 * - RWSEM_WRITE_EVERY: read cycles per thread between writes (default 100)
 * - RWSEM_STRATEGY: futex, condvar, spin or auto (default auto)
 * - RWSEM_UNITS: execution units (default: available CPUs)
 * - RWSEM_NO_LOG: skip the interleave log (default false)
 *
 * Prints the report as JSON and exits non-zero on any violation.
 */

use anyhow::{Context, Result};
use biased_rwsem::core::limits::{STRESS_ITERATIONS, STRESS_THREADS, STRESS_WRITE_EVERY};
use biased_rwsem::{init_tracing, run_stress, StrategyType, StressConfig, SyncConfig};
use std::str::FromStr;
use tracing::{error, info};

/// Parse an optional numeric environment variable
fn env_usize(name: &str, default: usize) -> Result<usize> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false)
}

fn load_config() -> Result<StressConfig> {
    let mut lock = SyncConfig::default();

    if let Ok(raw) = std::env::var("RWSEM_STRATEGY") {
        lock = lock.with_strategy(StrategyType::from_str(raw.trim())?);
    }
    if std::env::var("RWSEM_UNITS").is_ok() {
        lock = lock.with_units(env_usize("RWSEM_UNITS", 0)?);
    }

    let config = StressConfig {
        threads: env_usize("RWSEM_THREADS", STRESS_THREADS)?,
        iterations: env_usize("RWSEM_ITERATIONS", STRESS_ITERATIONS)?,
        write_every: env_usize("RWSEM_WRITE_EVERY", STRESS_WRITE_EVERY)?,
        record_log: !env_flag("RWSEM_NO_LOG"),
        lock,
    };

    // Thread bound, overflow of the cycle totals, interleave log size
    config.validate()?;

    Ok(config)
}

fn main() -> Result<()> {
    init_tracing();

    let config = load_config().context("invalid stress configuration")?;
    info!(?config, "rwsem-stress starting");

    let report = run_stress(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_clean() {
        error!(
            violations = report.violations,
            log_violations = report.log_violations,
            final_readers = report.final_readers,
            "Mutual exclusion violated"
        );
        std::process::exit(1);
    }

    info!(
        reads = report.reads,
        writes = report.writes,
        fast_path_ratio = report.stats.fast_path_ratio(),
        "rwsem-stress passed"
    );
    Ok(())
}
