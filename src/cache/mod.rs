//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, LRU eviction and
//! pattern-based invalidation.

mod concurrent;
mod entry;
mod expiry;
mod lru;
mod pattern;
mod stats;
mod store;


// Re-export public types
pub use concurrent::Cache;
pub(crate) use entry::CacheEntry;
pub use expiry::Ttl;
pub(crate) use lru::LruTracker;
pub use pattern::KeyPattern;
pub use stats::CacheStats;
pub use store::CacheStore;
