//! Tracing subscriber setup for binaries and test harnesses embedding the
//! registry. The library itself only emits events.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when `verbose`.
///
/// # Returns
/// true if this call installed the subscriber, false if one was already set
pub fn init(verbose: bool) -> bool {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
