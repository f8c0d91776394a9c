//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.
//!
//! `CacheStore` is not synchronized; `Cache` wraps it in a lock for shared use.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, KeyPattern, LruTracker, Ttl};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Capacity, TTL and key limits
    config: Config,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries the cache can hold
    /// * `default_ttl` - TTL for entries set with `Ttl::Default`; zero means never expires
    pub fn new(max_size: usize, default_ttl: Duration) -> Result<Self> {
        Self::with_config(Config {
            max_size,
            default_ttl,
            ..Config::default()
        })
    }

    /// Creates a new CacheStore from a full configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            config,
        })
    }

    // == Set ==
    /// Stores a key-value pair.
    ///
    /// If the key already exists, the value is overwritten and TTL is reset.
    /// If the key is new and the cache is at capacity, the least recently
    /// used entry is evicted first.
    pub fn set(&mut self, key: String, value: V, ttl: Ttl) -> Result<()> {
        self.set_at(key, value, ttl, Instant::now())
    }

    pub(crate) fn set_at(&mut self, key: String, value: V, ttl: Ttl, now: Instant) -> Result<()> {
        self.validate_key(&key)?;
        let ttl = self.resolve_ttl(ttl)?;

        // Overwrite in place; no eviction pressure
        if let Some(entry) = self.entries.get_mut(&key) {
            let tick = self.lru.touch(&key, Some(entry.tick));
            *entry = CacheEntry::new(value, ttl, now, tick);
            return Ok(());
        }

        // Normally one pass; more only after max_size was lowered
        while self.entries.len() >= self.config.max_size {
            let Some(victim) = self.lru.evict_oldest() else {
                break;
            };
            self.entries.remove(&victim);
            self.stats.record_eviction();
            debug!("Evicted least recently used key '{}'", victim);
        }

        let tick = self.lru.touch(&key, None);
        self.entries.insert(key, CacheEntry::new(value, ttl, now, tick));
        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns whether an entry was removed; deleting an absent key is not an error.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        self.validate_key(key)?;
        Ok(self.remove_entry(key).is_some())
    }

    // == Invalidate Pattern ==
    /// Removes every entry whose key matches a glob pattern.
    ///
    /// The pattern is compiled before anything is removed, so a malformed
    /// pattern leaves the cache untouched. Returns the number of entries removed.
    pub fn invalidate_pattern(&mut self, pattern: &str) -> Result<usize> {
        let pattern = KeyPattern::parse(pattern)?;
        Ok(self.invalidate_matching(&pattern))
    }

    /// Removes every entry whose key matches an already compiled pattern.
    pub fn invalidate_matching(&mut self, pattern: &KeyPattern) -> usize {
        let matched: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect();

        for key in &matched {
            self.remove_entry(key);
        }

        let count = matched.len();
        self.stats.record_invalidations(count);
        info!(
            "Pattern '{}' invalidated {} entries",
            pattern.as_str(),
            count
        );
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        self.cleanup_at(Instant::now())
    }

    pub(crate) fn cleanup_at(&mut self, now: Instant) -> usize {
        let lru = &mut self.lru;
        let before = self.entries.len();

        self.entries.retain(|_, entry| {
            let expired = entry.is_expired_at(now);
            if expired {
                lru.remove(entry.tick);
            }
            !expired
        });

        let count = before - self.entries.len();
        self.stats.record_expirations(count);
        if count > 0 {
            info!("Cleanup removed {} expired entries", count);
        } else {
            debug!("Cleanup found no expired entries");
        }
        count
    }

    // == Configure ==
    /// Replaces the capacity and default TTL.
    ///
    /// Existing entries are kept. If the new capacity is below the current
    /// size, the next insertion of a new key evicts down to it.
    pub fn configure(&mut self, max_size: usize, default_ttl: Duration) -> Result<()> {
        let candidate = Config {
            max_size,
            default_ttl,
            ..self.config.clone()
        };
        if let Err(e) = candidate.validate() {
            warn!("Rejected cache reconfiguration: {}", e);
            return Err(e);
        }

        debug!(
            "Cache reconfigured: max_size={}, default_ttl={}ms",
            max_size,
            default_ttl.as_millis()
        );
        self.config = candidate;
        Ok(())
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats
            .snapshot(self.entries.len(), self.config.max_size)
    }

    /// Zeroes the hit, miss and removal counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // == Inspection ==
    /// Checks for a live entry without touching recency or statistics.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    /// Returns the remaining TTL of a live entry.
    ///
    /// `None` if the key is absent or expired, `Some(None)` if it never expires.
    pub fn ttl_remaining(&self, key: &str) -> Option<Option<Duration>> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.ttl_remaining_at(now))
    }

    /// Removes every entry. Not counted as evictions.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // == Length ==
    /// Returns the current number of entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Internals ==
    fn validate_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key must not be empty".to_string()));
        }
        if let Some(max) = self.config.max_key_length {
            if key.len() > max {
                return Err(CacheError::InvalidKey(format!(
                    "Key exceeds maximum length of {} bytes",
                    max
                )));
            }
        }
        Ok(())
    }

    fn resolve_ttl(&self, ttl: Ttl) -> Result<Duration> {
        match ttl {
            Ttl::Default => Ok(self.config.default_ttl),
            Ttl::Never => Ok(Duration::ZERO),
            Ttl::After(ttl) => {
                self.config.check_ttl(ttl)?;
                Ok(ttl)
            }
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(entry.tick);
        Some(entry)
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.entries.len(), self.lru.len(), "entries and recency diverged");
        for key in self.lru.iter_oldest_first() {
            let entry = self.entries.get(key).expect("tracked key missing from entries");
            assert!(entry.last_accessed_at >= entry.created_at);
        }
    }

    #[cfg(test)]
    pub(crate) fn recency_order(&self) -> Vec<String> {
        self.lru.iter_oldest_first().map(str::to_string).collect()
    }
}

impl<V: Clone> CacheStore<V> {
    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `Ok(None)` when the key is absent or expired. Expired entries
    /// are removed on the spot and counted as misses.
    pub fn get(&mut self, key: &str) -> Result<Option<V>> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&mut self, key: &str, now: Instant) -> Result<Option<V>> {
        self.validate_key(key)?;

        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.record_miss();
            return Ok(None);
        };

        if entry.is_expired_at(now) {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            debug!("Removed expired key '{}' on access", key);
            return Ok(None);
        }

        let tick = self.lru.touch(key, Some(entry.tick));
        entry.touch(now, tick);
        let value = entry.value.clone();
        self.stats.record_hit();
        Ok(Some(value))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    fn store(max_size: usize) -> CacheStore<String> {
        CacheStore::new(max_size, TTL).unwrap()
    }

    fn set(store: &mut CacheStore<String>, key: &str, value: &str) {
        store
            .set(key.to_string(), value.to_string(), Ttl::Default)
            .unwrap();
    }

    #[test]
    fn test_store_new() {
        let store = store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_new_rejects_zero_capacity() {
        let result = CacheStore::<String>::new(0, TTL);
        assert!(matches!(result, Err(CacheError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);

        set(&mut store, "key1", "value1");

        assert_eq!(store.get("key1").unwrap(), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
        store.assert_consistent();
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(100);
        assert_eq!(store.get("nonexistent").unwrap(), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_empty_key_rejected() {
        let mut store = store(100);

        assert!(matches!(store.get(""), Err(CacheError::InvalidKey(_))));
        assert!(matches!(
            store.set(String::new(), "v".to_string(), Ttl::Default),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(store.delete(""), Err(CacheError::InvalidKey(_))));
        // Rejected lookups are not misses
        assert_eq!(store.stats().misses, 0);
    }

    #[test]
    fn test_store_key_too_long() {
        let mut store: CacheStore<String> = CacheStore::with_config(Config {
            max_key_length: Some(16),
            ..Config::default()
        })
        .unwrap();
        let long_key = "x".repeat(17);

        let result = store.set(long_key.clone(), "value".to_string(), Ttl::Default);
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
        assert!(matches!(store.get(&long_key), Err(CacheError::InvalidKey(_))));
        assert!(store.is_empty());

        // At the limit is fine
        set(&mut store, &"y".repeat(16), "value");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_long_keys_allowed_by_default() {
        let mut store = store(10);
        let long_key = "k".repeat(300);

        assert_eq!(store.get(&long_key).unwrap(), None);
        assert_eq!(store.stats().misses, 1);

        set(&mut store, &long_key, "value");
        assert_eq!(store.get(&long_key).unwrap(), Some("value".to_string()));
        assert!(store.delete(&long_key).unwrap());
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(100);

        set(&mut store, "key1", "value1");
        assert!(store.delete("key1").unwrap());

        assert!(store.is_empty());
        assert_eq!(store.get("key1").unwrap(), None);
        store.assert_consistent();
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store = store(100);
        set(&mut store, "key1", "value1");

        assert!(!store.delete("nonexistent").unwrap());
        assert_eq!(store.stats().current_size, 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(100);

        set(&mut store, "key1", "value1");
        set(&mut store, "key1", "value2");

        assert_eq!(store.get("key1").unwrap(), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
        store.assert_consistent();
    }

    #[test]
    fn test_store_overwrite_at_capacity_does_not_evict() {
        let mut store = store(2);

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");
        set(&mut store, "a", "3");

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
        // Overwrite promoted "a", so "b" is next in line
        assert_eq!(store.recency_order(), vec!["b", "a"]);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store(100);
        let now = Instant::now();

        store
            .set_at("key1".to_string(), "value1".to_string(), Ttl::After(Duration::from_millis(1)), now)
            .unwrap();

        // Should be accessible before the deadline
        assert!(store.get_at("key1", now).unwrap().is_some());

        let later = now + Duration::from_millis(1);
        assert_eq!(store.get_at("key1", later).unwrap(), None);

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.evictions, 0);
        assert!(store.is_empty());
        store.assert_consistent();
    }

    #[test]
    fn test_store_lazy_expiry_removes_only_accessed_entry() {
        let mut store = store(100);
        let now = Instant::now();
        let ttl = Ttl::After(Duration::from_millis(1));

        store.set_at("a".to_string(), "1".to_string(), ttl, now).unwrap();
        store.set_at("b".to_string(), "2".to_string(), ttl, now).unwrap();

        assert_eq!(store.get_at("a", now + Duration::from_millis(1)).unwrap(), None);

        // "b" is expired too but was not accessed
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().expirations, 1);
        assert_eq!(store.recency_order(), vec!["b"]);
        store.assert_consistent();
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let mut store = store(100);
        let now = Instant::now();
        let short = Ttl::After(Duration::from_millis(10));

        store.set_at("k".to_string(), "v1".to_string(), short, now).unwrap();
        store
            .set_at("k".to_string(), "v2".to_string(), Ttl::Never, now + Duration::from_millis(5))
            .unwrap();

        let far = now + Duration::from_secs(3600);
        assert_eq!(store.get_at("k", far).unwrap(), Some("v2".to_string()));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);

        set(&mut store, "key1", "value1");
        set(&mut store, "key2", "value2");
        set(&mut store, "key3", "value3");

        // Cache is full, adding key4 should evict key1 (oldest)
        set(&mut store, "key4", "value4");

        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().evictions, 1);
        assert_eq!(store.get("key1").unwrap(), None);
        assert!(store.get("key2").unwrap().is_some());
        assert!(store.get("key3").unwrap().is_some());
        assert!(store.get("key4").unwrap().is_some());
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = store(2);

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");

        // Access "a" to make it most recently used
        store.get("a").unwrap();

        // Adding "c" should evict "b" (now oldest)
        set(&mut store, "c", "3");

        assert_eq!(store.recency_order(), vec!["a", "c"]);
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn test_store_ties_evict_earlier_update() {
        let mut store = store(2);
        let now = Instant::now();

        // Same timestamp for every write; insertion order decides
        store.set_at("x".to_string(), "1".to_string(), Ttl::Never, now).unwrap();
        store.set_at("y".to_string(), "2".to_string(), Ttl::Never, now).unwrap();
        store.set_at("z".to_string(), "3".to_string(), Ttl::Never, now).unwrap();

        assert_eq!(store.recency_order(), vec!["y", "z"]);
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(100);

        set(&mut store, "key1", "value1");
        store.get("key1").unwrap(); // hit
        store.get("nonexistent").unwrap(); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.current_size, 1);
        assert_eq!(stats.max_size, 100);
        assert_eq!(stats.hit_ratio, 0.5);
    }

    #[test]
    fn test_store_reset_stats() {
        let mut store = store(100);
        set(&mut store, "key1", "value1");
        store.get("key1").unwrap();

        store.reset_stats();

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.current_size, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store(100);
        let now = Instant::now();

        store
            .set_at("key1".to_string(), "v".to_string(), Ttl::After(Duration::from_secs(1)), now)
            .unwrap();
        store
            .set_at("key2".to_string(), "v".to_string(), Ttl::After(Duration::from_secs(10)), now)
            .unwrap();
        store.set_at("key3".to_string(), "v".to_string(), Ttl::Never, now).unwrap();

        let removed = store.cleanup_at(now + Duration::from_secs(2));

        assert_eq!(removed, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().expirations, 1);
        assert_eq!(store.recency_order(), vec!["key2", "key3"]);
        store.assert_consistent();
    }

    #[test]
    fn test_store_invalidate_pattern() {
        let mut store = store(100);

        set(&mut store, "user:1", "a");
        set(&mut store, "user:2", "b");
        set(&mut store, "order:1", "c");

        assert_eq!(store.invalidate_pattern("user:*").unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("order:1").unwrap(), Some("c".to_string()));

        // Second pass finds nothing left to remove
        assert_eq!(store.invalidate_pattern("user:*").unwrap(), 0);
        assert_eq!(store.stats().invalidations, 2);
        store.assert_consistent();
    }

    #[test]
    fn test_store_invalid_pattern_leaves_entries() {
        let mut store = store(100);
        set(&mut store, "user:1", "a");

        assert!(matches!(
            store.invalidate_pattern(""),
            Err(CacheError::InvalidPattern(_))
        ));
        assert!(matches!(
            store.invalidate_pattern("user:[1"),
            Err(CacheError::InvalidPattern(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_bounds() {
        let mut store: CacheStore<u32> = CacheStore::with_config(Config {
            max_ttl: Some(Duration::from_secs(60)),
            default_ttl: Duration::from_secs(30),
            ..Config::default()
        })
        .unwrap();

        assert!(store
            .set("ok".to_string(), 1, Ttl::After(Duration::from_secs(60)))
            .is_ok());
        assert!(matches!(
            store.set("too_long".to_string(), 2, Ttl::After(Duration::from_secs(61))),
            Err(CacheError::InvalidConfiguration(_))
        ));
        // Never is not bounded by max_ttl
        assert!(store.set("forever".to_string(), 3, Ttl::Never).is_ok());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_maximum_ttl_never_expires() {
        let mut store = store(10);
        let now = Instant::now();

        store
            .set_at("max".to_string(), "v".to_string(), Ttl::After(Duration::MAX), now)
            .unwrap();

        assert_eq!(store.ttl_remaining("max"), Some(None));
        assert_eq!(store.cleanup_at(now + Duration::from_secs(86_400)), 0);
    }

    #[test]
    fn test_store_configure_lowered_limit() {
        let mut store = store(4);
        for key in ["a", "b", "c", "d"] {
            set(&mut store, key, "v");
        }

        store.configure(2, TTL).unwrap();

        // Existing entries survive until the next insertion
        assert_eq!(store.len(), 4);
        assert_eq!(store.stats().max_size, 2);

        set(&mut store, "e", "v");

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 3);
        assert_eq!(store.recency_order(), vec!["d", "e"]);
        store.assert_consistent();
    }

    #[test]
    fn test_store_configure_rejects_invalid() {
        let mut store = store(4);

        assert!(matches!(
            store.configure(0, TTL),
            Err(CacheError::InvalidConfiguration(_))
        ));
        assert_eq!(store.config().max_size, 4);
    }

    #[test]
    fn test_store_configure_default_ttl() {
        let mut store = store(4);
        let now = Instant::now();

        store.configure(4, Duration::from_millis(50)).unwrap();
        store
            .set_at("k".to_string(), "v".to_string(), Ttl::Default, now)
            .unwrap();

        assert_eq!(store.get_at("k", now + Duration::from_millis(50)).unwrap(), None);
    }

    #[test]
    fn test_store_contains_and_ttl_remaining() {
        let mut store = store(10);
        set(&mut store, "k", "v");

        assert!(store.contains_key("k"));
        assert!(!store.contains_key("missing"));
        let remaining = store.ttl_remaining("k").unwrap().unwrap();
        assert!(remaining <= TTL);
        assert_eq!(store.ttl_remaining("missing"), None);

        // Inspection does not count as a lookup
        assert_eq!(store.stats().hits + store.stats().misses, 0);
    }

    #[test]
    fn test_store_clear() {
        let mut store = store(10);
        set(&mut store, "a", "1");
        set(&mut store, "b", "2");

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.stats().evictions, 0);
        store.assert_consistent();
    }
}
