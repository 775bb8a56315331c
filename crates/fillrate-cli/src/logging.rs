//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so they never mix with report output on stdout.
//!
//! # Log Levels
//!
//! - `warn`: discarded combination segments, progress output failures
//! - `info`: run start and finish
//! - `debug`: configuration details
//! - `trace`: per-row evaluation

use std::io;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Map the `-v` count to a level.
///
/// - 0: warn
/// - 1: debug
/// - 2+: trace
pub fn level_from_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity level.
pub fn init_logging(verbosity: u8) -> io::Result<()> {
    let filter = build_env_filter(level_from_verbosity(verbosity));
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(verbosity > 1)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(io::Error::other)
}

fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();

    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Other crates stay at warn
        EnvFilter::new(format!("warn,fillrate={level},fillrate_cli={level}"))
    })
}
