//! Configuration structures for the Deezer gateway client.
//!
//! Every field has a default so a partial YAML document (or none at all)
//! yields a usable configuration:
//!
//! ```yaml
//! endpoint: https://www.deezer.com/ajax/gw-light.php
//! request_timeout_secs: 30
//! retry:
//!   max_attempts: 4
//!   initial_backoff_ms: 5000
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default gateway endpoint
pub const DEFAULT_ENDPOINT: &str = "https://www.deezer.com/ajax/gw-light.php";

/// Default timeout for one HTTP exchange
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GwConfig {
    #[serde(default = "GwConfig::default_endpoint")]
    pub endpoint: String,
    #[serde(default = "GwConfig::default_api_version")]
    pub api_version: String,
    #[serde(default = "GwConfig::default_input")]
    pub input: String,
    #[serde(default = "GwConfig::default_lang")]
    pub lang: String,
    #[serde(default = "GwConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl GwConfig {
    fn default_endpoint() -> String {
        DEFAULT_ENDPOINT.to_string()
    }

    fn default_api_version() -> String {
        "1.0".to_string()
    }

    fn default_input() -> String {
        "3".to_string()
    }

    fn default_lang() -> String {
        "en".to_string()
    }

    const fn default_request_timeout_secs() -> u64 {
        DEFAULT_REQUEST_TIMEOUT_SECS
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No gateway config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Timeout applied to every HTTP exchange
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::config("retry.max_attempts must be at least 1"));
        }
        if self.retry.jitter_min_ms > self.retry.jitter_max_ms {
            return Err(Error::config(format!(
                "retry.jitter_min_ms ({}) exceeds retry.jitter_max_ms ({})",
                self.retry.jitter_min_ms, self.retry.jitter_max_ms
            )));
        }
        Ok(())
    }
}

impl Default for GwConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            api_version: Self::default_api_version(),
            input: Self::default_input(),
            lang: Self::default_lang(),
            request_timeout_secs: Self::default_request_timeout_secs(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Retry, backoff and pacing parameters of the call engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// HTTP attempts per pass when the gateway answers 403/429
    #[serde(default = "RetryPolicy::default_max_attempts")]
    pub max_attempts: u32,
    /// First rate-limit delay, doubled after each throttled attempt
    #[serde(default = "RetryPolicy::default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Fixed delay before replaying a call after a connection fault
    #[serde(default = "RetryPolicy::default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "RetryPolicy::default_jitter_min_ms")]
    pub jitter_min_ms: u64,
    #[serde(default = "RetryPolicy::default_jitter_max_ms")]
    pub jitter_max_ms: u64,
    /// Reconnects, token refreshes and fallback replays allowed per logical call, combined
    #[serde(default = "RetryPolicy::default_max_recoveries")]
    pub max_recoveries: u32,
}

impl RetryPolicy {
    const fn default_max_attempts() -> u32 {
        4
    }

    const fn default_initial_backoff_ms() -> u64 {
        5000
    }

    const fn default_reconnect_delay_ms() -> u64 {
        2000
    }

    const fn default_jitter_min_ms() -> u64 {
        100
    }

    const fn default_jitter_max_ms() -> u64 {
        150
    }

    const fn default_max_recoveries() -> u32 {
        Self::default_max_attempts()
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::default_max_attempts(),
            initial_backoff_ms: Self::default_initial_backoff_ms(),
            reconnect_delay_ms: Self::default_reconnect_delay_ms(),
            jitter_min_ms: Self::default_jitter_min_ms(),
            jitter_max_ms: Self::default_jitter_max_ms(),
            max_recoveries: Self::default_max_recoveries(),
        }
    }
}
