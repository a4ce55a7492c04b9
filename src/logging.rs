//! Logging setup for the command-line binary.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! caller's business.

use tracing_subscriber::EnvFilter;

/// Human-readable output to stderr, filtered by `RUST_LOG` (default: `info`).
///
/// Stdout stays clean for the JSON the subcommands print.
pub fn init_cli() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
