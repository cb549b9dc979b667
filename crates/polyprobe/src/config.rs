//! Run configuration.
//!
//! Loaded from YAML, then overridden by environment variables:
//!
//! | Variable              | Field                        |
//! |-----------------------|------------------------------|
//! | `POLYPROBE_BASE_URL`  | `base_url`                   |
//! | `POLYPROBE_TIMEOUT_MS`| `default_command_timeout_ms` |
//! | `CHROMIUM_PATH`       | `chromium_path`              |

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::result::{ProbeError, ProbeResult};
use crate::viewport::Viewport;
use crate::wait::{WaitOptions, DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS};

/// Base URL relative page URLs are joined to
pub const DEFAULT_BASE_URL: &str = "https://www.google.com";

/// Environment variable overriding [`ProbeConfig::base_url`]
pub const ENV_BASE_URL: &str = "POLYPROBE_BASE_URL";
/// Environment variable overriding [`ProbeConfig::default_command_timeout_ms`]
pub const ENV_TIMEOUT_MS: &str = "POLYPROBE_TIMEOUT_MS";
/// Environment variable overriding [`ProbeConfig::chromium_path`]
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";

/// Configuration shared by hosts and page objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Base URL for relative visits
    pub base_url: String,
    /// Timeout for element queries and assertions
    pub default_command_timeout_ms: u64,
    /// Retry interval for queries and assertions
    pub poll_interval_ms: u64,
    /// Run the browser without a window
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Allow script access into cross-origin frames
    pub disable_web_security: bool,
    /// Viewport applied when a page is opened
    pub default_viewport: Viewport,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            headless: true,
            chromium_path: None,
            disable_web_security: true,
            default_viewport: Viewport::DESKTOP,
        }
    }
}

impl ProbeConfig {
    /// Parse YAML; missing fields take their defaults
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> ProbeResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (keyed by environment variable name)
    pub fn with_overrides_from<F>(mut self, lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            self.default_command_timeout_ms = timeout.trim().parse().map_err(|_| ProbeError::Config {
                message: format!("{ENV_TIMEOUT_MS} must be a number of milliseconds, got '{timeout}'"),
            })?;
        }
        if let Some(path) = lookup(ENV_CHROMIUM_PATH) {
            self.chromium_path = Some(path);
        }
        self.validate()?;
        Ok(self)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the command timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.default_command_timeout_ms = timeout_ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Toggle cross-origin frame access
    #[must_use]
    pub const fn with_disable_web_security(mut self, disable: bool) -> Self {
        self.disable_web_security = disable;
        self
    }

    /// Set the initial viewport
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.default_viewport = viewport;
        self
    }

    /// Wait options for element queries
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.default_command_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Reject values no host can work with
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::Config {
                message: format!("base_url must be an http(s) URL, got '{}'", self.base_url),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::Config {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        if self.default_viewport.width == 0 || self.default_viewport.height == 0 {
            return Err(ProbeError::Config {
                message: "default_viewport must have a non-zero size".to_string(),
            });
        }
        Ok(())
    }
}
