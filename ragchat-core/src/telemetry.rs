//! Tracing bootstrap for binaries and examples.

use tracing_subscriber::EnvFilter;

/// Install a process-global `tracing` subscriber.
///
/// Reads the filter from `RUST_LOG`, defaulting to `info` for the ragchat
/// crates. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ragchat=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
