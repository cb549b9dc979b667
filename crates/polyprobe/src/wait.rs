//! Wait Mechanisms
//!
//! Every element query and assertion auto-waits: the probe is retried at
//! a fixed interval until it yields a value or the timeout elapses.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::result::{ProbeError, ProbeResult};

/// Default timeout for element queries and assertions (4 seconds)
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 4_000;

/// Default timeout for page loads and alias waits (30 seconds)
pub const DEFAULT_PAGE_LOAD_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Retry `probe` until it returns `Some`, or fail with [`ProbeError::Timeout`].
///
/// The probe always runs at least once. Errors from the probe abort the
/// wait immediately.
pub async fn poll_until<T, F, Fut>(
    options: &WaitOptions,
    waited_for: &str,
    mut probe: F,
) -> ProbeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if let Some(value) = probe().await? {
            if attempts > 1 {
                debug!(attempts, elapsed_ms = start.elapsed().as_millis() as u64, "{waited_for} satisfied");
            }
            return Ok(value);
        }
        if start.elapsed() >= options.timeout() {
            return Err(ProbeError::Timeout {
                ms: options.timeout_ms,
                waited_for: waited_for.to_string(),
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Retry a boolean condition; see [`poll_until`]
pub async fn wait_for<F, Fut>(options: &WaitOptions, waited_for: &str, mut condition: F) -> ProbeResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<bool>>,
{
    poll_until(options, waited_for, || {
        let fut = condition();
        async move { Ok(fut.await?.then_some(())) }
    })
    .await
}

/// Fixed pause for animations to settle (discouraged - prefer conditions)
pub async fn settle(duration_ms: u64) {
    tokio::time::sleep(Duration::from_millis(duration_ms)).await;
}
