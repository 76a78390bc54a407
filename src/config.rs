//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::{CacheError, Result};

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Time-to-live in milliseconds, renewed on every get. None = never expire
    pub ttl_ms: Option<u64>,
}

impl CacheConfig {
    /// Creates a config with the given capacity and optional ttl.
    pub fn new(capacity: usize, ttl_ms: Option<u64>) -> Self {
        Self { capacity, ttl_ms }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `CACHE_TTL_MS` - TTL in milliseconds (default: unset, no expiration)
    ///
    /// Values that fail to parse fall back to the default.
    pub fn from_env() -> Self {
        let capacity = match env::var("CACHE_CAPACITY") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Ignoring unparseable CACHE_CAPACITY");
                DEFAULT_CAPACITY
            }),
            Err(_) => DEFAULT_CAPACITY,
        };

        let ttl_ms = match env::var("CACHE_TTL_MS") {
            Ok(raw) if raw.trim().is_empty() => None,
            Ok(raw) => match raw.trim().parse() {
                Ok(ms) => Some(ms),
                Err(_) => {
                    warn!(value = %raw, "Ignoring unparseable CACHE_TTL_MS");
                    None
                }
            },
            Err(_) => None,
        };

        Self { capacity, ttl_ms }
    }

    /// Returns the ttl as a Duration, if one is configured.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }

    /// Checks that capacity is positive and ttl, when present, is non-zero.
    pub fn validate(&self) -> Result<()> {
        validate(self.capacity, self.ttl())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl_ms: None,
        }
    }
}

pub(crate) fn validate(capacity: usize, ttl: Option<Duration>) -> Result<()> {
    if capacity == 0 {
        return Err(CacheError::Configuration(
            "capacity must be a positive integer".to_string(),
        ));
    }
    if ttl.is_some_and(|ttl| ttl.is_zero()) {
        return Err(CacheError::Configuration(
            "ttl must be a positive duration".to_string(),
        ));
    }
    Ok(())
}
