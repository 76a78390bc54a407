//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity or ttl rejected at construction time
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Ordered index already holds an entry for this key
    #[error("Duplicate key: entry is already present in the index")]
    DuplicateKey,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
