//! Logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process, filtered through `RUST_LOG`
/// (`info` when unset). Logs go to stderr, stdout carries the CSV output.
pub(crate) fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
