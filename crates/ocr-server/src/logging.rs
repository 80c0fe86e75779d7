//! Structured logging setup via `tracing_subscriber::fmt().with_env_filter(...)`.

use std::env;

use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber. `RUST_LOG` controls
/// verbosity; defaults to `info` when unset.
pub fn init() {
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let env_filter = match rust_log.is_empty() {
        true => EnvFilter::builder().parse_lossy("info"),
        false => EnvFilter::builder().parse_lossy(rust_log),
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
