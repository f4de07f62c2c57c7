//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// The struct also deserializes from a host application's own config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of recently used values the cache keeps strongly referenced (0 = pure weak cache)
    pub retain_capacity: usize,
    /// Maximum age of a cached value in seconds, None = values never go stale
    pub value_ttl: Option<u64>,
    /// Background purge task interval in seconds
    pub purge_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `WEAK_CACHE_RETAIN_CAPACITY` - Strongly retained values (default: 0)
    /// - `WEAK_CACHE_VALUE_TTL` - Max value age in seconds, 0 or unset disables it
    /// - `WEAK_CACHE_PURGE_INTERVAL` - Purge frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            retain_capacity: env::var("WEAK_CACHE_RETAIN_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retain_capacity),
            value_ttl: env::var("WEAK_CACHE_VALUE_TTL")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ttl| *ttl > 0),
            purge_interval: env::var("WEAK_CACHE_PURGE_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.purge_interval),
        }
    }

    /// Maximum value age as a Duration.
    pub fn value_ttl(&self) -> Option<Duration> {
        self.value_ttl.filter(|ttl| *ttl > 0).map(Duration::from_secs)
    }

    /// Checks values that cannot be corrected silently.
    pub fn validate(&self) -> Result<()> {
        if self.purge_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "purge_interval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retain_capacity: 0,
            value_ttl: None,
            purge_interval: 30,
        }
    }
}
