// src/logging.rs

//! Logging setup for `insightboard` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `INSIGHTBOARD_LOG` environment variable: either a bare level
//!    ("debug") or a full filter directive
//!    ("insightboard::engine=debug,insightboard::dag=trace")
//! 3. default to `info`
//!
//! A bare level applies to this crate's targets only; dependencies stay at
//! `warn` so that job and task events are not drowned out.
//!
//! Logs are sent to STDERR so that stdout carries only the task list.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "INSIGHTBOARD_LOG";

/// Target prefix shared by every event this crate emits.
const CRATE_TARGET: &str = "insightboard";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(cli_level, env_value.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;

    Ok(())
}

/// Resolve the effective filter from the CLI flag and the raw value of
/// `INSIGHTBOARD_LOG`.
///
/// An environment value that is neither a level name nor a valid directive
/// is an error rather than being silently ignored.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    if let Some(lvl) = cli_level {
        return Ok(crate_filter(level_from_log_level(lvl)));
    }

    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(crate_filter(tracing::Level::INFO)),
        Some(value) => match parse_level_str(value) {
            Some(level) => Ok(crate_filter(level)),
            None => EnvFilter::try_new(value)
                .with_context(|| format!("invalid {LOG_ENV_VAR} value {value:?}")),
        },
    }
}

fn crate_filter(level: tracing::Level) -> EnvFilter {
    let level = level.as_str().to_ascii_lowercase();
    EnvFilter::new(format!("warn,{CRATE_TARGET}={level}"))
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

/// Parse a level name as accepted by `INSIGHTBOARD_LOG`.
pub fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
