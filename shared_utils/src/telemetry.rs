//! Process-wide `tracing` subscriber setup for binaries.
//!
//! Libraries in this workspace only emit events; installing a subscriber is
//! left to `main`.

use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a fmt subscriber writing to stderr, filtered by `RUST_LOG`.
///
/// Stdout stays free for command output. Calling this twice is harmless; the
/// second call leaves the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
