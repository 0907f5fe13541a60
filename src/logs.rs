//! Logging setup.
//!
//! The library only emits `tracing` events; binaries decide where they go.

use std::env;
use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber for `tracing` events.
///
/// `RUST_LOG` takes precedence when set. Otherwise the `DEBUG` environment
/// variable turns on debug output for this crate, and only warnings are
/// shown when it is absent. Calling this more than once is harmless: later
/// calls leave the first subscriber in place.
///
/// Nothing should be written to the terminal this way while it is in raw
/// mode without accounting for the missing carriage returns.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if env::var("DEBUG").is_ok() {
            EnvFilter::new("ttymode=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
