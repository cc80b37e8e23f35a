// src/logging.rs

//! Subscriber setup for the `myst` binary.
//!
//! The level applies to `myst`'s own targets; other crates (notify, globset,
//! the template engines) stay at `warn` unless asked for explicitly.
//! Sources, highest priority first:
//! 1. `--log-level` on the command line;
//! 2. `MYST_LOG`, either a level word ("verbose", "debug", ...) or a full
//!    directive list such as `myst::watch=trace,notify=debug`;
//! 3. `info`.
//!
//! A build's *verbose* messages (skipped files, resolved paths, cache hits)
//! are emitted at `debug`.

use anyhow::Result;
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "MYST_LOG";

/// Install the global subscriber. Call once, at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = filter_for(cli_level, env.as_deref());
    let detailed = filter
        .max_level_hint()
        .is_some_and(|hint| hint >= LevelFilter::DEBUG);

    fmt()
        .with_env_filter(filter)
        .with_target(detailed)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Filter for a CLI level and the raw value of `MYST_LOG`.
///
/// An unparsable `MYST_LOG` is ignored in favour of the default.
pub fn filter_for(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(lvl) = cli_level {
        return scoped(level_from_log_level(lvl));
    }
    let Some(raw) = env.map(str::trim).filter(|s| !s.is_empty()) else {
        return scoped(Level::INFO);
    };
    if let Some(level) = parse_level_str(raw) {
        return scoped(level);
    }
    EnvFilter::try_new(raw).unwrap_or_else(|_| scoped(Level::INFO))
}

/// `level` for myst, and no more than `warn` for everything else.
fn scoped(level: Level) -> EnvFilter {
    let others = if level < Level::WARN { level } else { Level::WARN };
    EnvFilter::new(format!("{},myst={}", others, level).to_lowercase())
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Verbose | LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

pub fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "verbose" | "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
