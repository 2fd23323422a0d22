//! Tracing setup for hosts embedding the library.
//!
//! The crate itself only emits `tracing` events; installing a subscriber
//! is the host's call. These helpers give embedding apps the one-liner
//! they want without forcing a subscriber on anyone.

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber at `info` level (overridable through
/// `RUST_LOG`). Safe to call more than once; later calls are no-ops.
pub fn init() {
    init_with_filter("info");
}

/// Install a formatted subscriber with an explicit default filter.
pub fn init_with_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// ── Tests ──────────────────────────────────────────────────────────
