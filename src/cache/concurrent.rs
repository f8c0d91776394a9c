//! Thread-safe Cache Handle
//!
//! Wraps a `CacheStore` in a single reader/writer lock so every public
//! operation is applied as one atomic unit.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::cache::{CacheStats, CacheStore, KeyPattern, Ttl};
use crate::config::Config;
use crate::error::Result;

// == Cache ==
/// Shareable cache handle.
///
/// Cloning the handle is cheap and every clone sees the same entries.
/// Lookups take the write side of the lock because they update recency and
/// may remove an expired entry; `stats` and the inspection helpers only read.
pub struct Cache<V> {
    inner: Arc<RwLock<CacheStore<V>>>,
}

impl<V> Cache<V> {
    /// Creates a cache with the given capacity and default TTL.
    pub fn new(max_size: usize, default_ttl: Duration) -> Result<Self> {
        CacheStore::new(max_size, default_ttl).map(Self::from_store)
    }

    /// Creates a cache from a full configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        CacheStore::with_config(config).map(Self::from_store)
    }

    /// Wraps an existing store.
    pub fn from_store(store: CacheStore<V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Stores a value; see [`CacheStore::set`].
    pub fn set(&self, key: impl Into<String>, value: V, ttl: impl Into<Ttl>) -> Result<()> {
        self.inner.write().set(key.into(), value, ttl.into())
    }

    /// Removes a key; absent keys are not an error.
    pub fn delete(&self, key: &str) -> Result<bool> {
        self.inner.write().delete(key)
    }

    /// Removes every entry whose key matches a glob pattern.
    pub fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        // Compile outside the lock
        let pattern = KeyPattern::parse(pattern)?;
        Ok(self.inner.write().invalidate_matching(&pattern))
    }

    /// Removes all expired entries and returns how many were dropped.
    pub fn cleanup(&self) -> usize {
        self.inner.write().cleanup()
    }

    /// Replaces the capacity and default TTL for subsequent operations.
    pub fn configure(&self, max_size: usize, default_ttl: Duration) -> Result<()> {
        self.inner.write().configure(max_size, default_ttl)
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.read().stats()
    }

    pub fn reset_stats(&self) {
        self.inner.write().reset_stats();
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    pub fn ttl_remaining(&self, key: &str) -> Option<Option<Duration>> {
        self.inner.read().ttl_remaining(key)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn config(&self) -> Config {
        self.inner.read().config().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<V: Clone> Cache<V> {
    /// Looks up a live value, promoting it to most recently used.
    pub fn get(&self, key: &str) -> Result<Option<V>> {
        self.inner.write().get(key)
    }
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.inner.read();
        f.debug_struct("Cache")
            .field("len", &store.len())
            .field("config", store.config())
            .finish()
    }
}
