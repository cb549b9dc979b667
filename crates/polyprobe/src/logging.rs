//! Subscriber setup for the crate's `tracing` events.

use tracing_subscriber::EnvFilter;

use crate::result::{ProbeError, ProbeResult};

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "POLYPROBE_LOG";

/// Directive used when [`LOG_ENV`] is unset or invalid
pub const DEFAULT_DIRECTIVE: &str = "polyprobe=info";

/// Filter from [`LOG_ENV`], falling back to [`DEFAULT_DIRECTIVE`]
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install a human-readable subscriber
pub fn init() -> ProbeResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init()
        .map_err(|e| ProbeError::Config {
            message: format!("logging already initialized: {e}"),
        })
}

/// Install a JSON-lines subscriber (for CI log collection)
pub fn init_json() -> ProbeResult<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .try_init()
        .map_err(|e| ProbeError::Config {
            message: format!("logging already initialized: {e}"),
        })
}

/// Route events to the test harness output; safe to call from every test
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init();
}
