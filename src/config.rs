//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Defaults ==
const DEFAULT_MAX_SIZE: usize = 1000;
const DEFAULT_TTL_MS: u64 = 300_000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_size: usize,
    /// TTL applied when a caller asks for the default; zero means never expires
    pub default_ttl: Duration,
    /// Upper bound for any explicit or default TTL, None = unbounded
    pub max_ttl: Option<Duration>,
    /// Maximum allowed key length in bytes, None = unbounded
    pub max_key_length: Option<usize>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_TTL_MS` - Upper TTL bound in milliseconds (default: unbounded)
    /// - `CACHE_MAX_KEY_LENGTH` - Maximum key length in bytes (default: unbounded)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self {
            max_size: parse_var("CACHE_MAX_SIZE").unwrap_or(DEFAULT_MAX_SIZE),
            default_ttl: Duration::from_millis(
                parse_var("CACHE_DEFAULT_TTL_MS").unwrap_or(DEFAULT_TTL_MS),
            ),
            max_ttl: parse_var("CACHE_MAX_TTL_MS").map(Duration::from_millis),
            max_key_length: parse_var("CACHE_MAX_KEY_LENGTH"),
        }
    }

    // == Validate ==
    /// Checks that the configuration describes a usable cache.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfiguration(
                "max_size must be positive".to_string(),
            ));
        }
        if self.max_key_length == Some(0) {
            return Err(CacheError::InvalidConfiguration(
                "max_key_length must be positive".to_string(),
            ));
        }
        self.check_ttl(self.default_ttl)
    }

    // == Check TTL ==
    /// Rejects a TTL above `max_ttl`.
    pub fn check_ttl(&self, ttl: Duration) -> Result<()> {
        match self.max_ttl {
            Some(max) if ttl > max => Err(CacheError::InvalidConfiguration(format!(
                "TTL of {}ms exceeds maximum of {}ms",
                ttl.as_millis(),
                max.as_millis()
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl: Duration::from_millis(DEFAULT_TTL_MS),
            max_ttl: None,
            max_key_length: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
