//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// Every variant is returned before any mutation takes place, so a failed
/// call leaves the cache exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is empty or exceeds the configured length limit
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalidation pattern is empty or malformed
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Capacity or TTL value outside the allowed bounds
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
