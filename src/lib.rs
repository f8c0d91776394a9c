//! Cache Utility - An in-process generic key-value cache
//!
//! Provides per-entry TTL expiration, bounded capacity with LRU eviction,
//! glob-pattern invalidation and runtime statistics behind a thread-safe handle.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, CacheStats, CacheStore, KeyPattern, Ttl};
pub use config::Config;
pub use error::{CacheError, Result};
