//! Configuration Module
//!
//! Handles loading the request layer configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::StoreConfig;

/// Request layer configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every request path is resolved against
    pub api_base_url: String,
    /// Per-call transport timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Seconds a zero-subscriber entry is kept before eviction
    pub eviction_grace: u64,
    /// Background eviction sweep interval in seconds
    pub eviction_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` - Backend base URL (default: http://localhost:3000)
    /// - `REQUEST_TIMEOUT_MS` - Transport timeout in ms (default: 10000)
    /// - `EVICTION_GRACE_SECS` - Unused entry grace period (default: 60)
    /// - `EVICTION_INTERVAL_SECS` - Eviction sweep frequency (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env::var("API_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base_url),
            request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS").unwrap_or(defaults.request_timeout_ms),
            eviction_grace: parse_var("EVICTION_GRACE_SECS").unwrap_or(defaults.eviction_grace),
            eviction_interval: parse_var("EVICTION_INTERVAL_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.eviction_interval),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            eviction_grace: Duration::from_secs(self.eviction_grace),
        }
    }
}

fn parse_var(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            request_timeout_ms: 10_000,
            eviction_grace: 60,
            eviction_interval: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.eviction_grace, 60);
        assert_eq!(config.eviction_interval, 1);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("API_BASE_URL");
        env::remove_var("REQUEST_TIMEOUT_MS");
        env::remove_var("EVICTION_GRACE_SECS");
        env::remove_var("EVICTION_INTERVAL_SECS");

        let config = Config::from_env();
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.store_config().eviction_grace, Duration::from_secs(60));
    }
}
