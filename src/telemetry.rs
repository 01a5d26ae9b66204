//! Tracing setup for embedding applications.

use tracing_subscriber::EnvFilter;

/// Install a global subscriber reading `RUST_LOG`, defaulting to `info`
/// with this crate at `debug`. Safe to call more than once; later calls
/// are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,benchstock=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
