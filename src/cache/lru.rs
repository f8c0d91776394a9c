//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::BTreeMap;

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Every touch stamps the key with the next value of a monotonic logical
/// clock. Keys are stored by tick, so:
/// - Smallest tick = Least recently used
/// - Largest tick = Most recently used
///
/// Ticks are unique, which breaks ties between accesses that share a
/// timestamp: the key touched earlier is evicted first.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Keys ordered by last access tick
    order: BTreeMap<u64, String>,
    /// Next tick to hand out
    clock: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            order: BTreeMap::new(),
            clock: 0,
        }
    }

    // == Touch ==
    /// Marks a key as most recently used and returns its new tick.
    ///
    /// `previous` is the tick the key currently holds, if it is tracked.
    pub fn touch(&mut self, key: &str, previous: Option<u64>) -> u64 {
        let reused = previous
            .and_then(|tick| self.order.remove(&tick))
            .unwrap_or_else(|| key.to_string());
        let tick = self.clock;
        self.clock += 1;
        self.order.insert(tick, reused);
        tick
    }

    // == Remove ==
    /// Stops tracking the key holding `tick`.
    pub fn remove(&mut self, tick: u64) -> Option<String> {
        self.order.remove(&tick)
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_first().map(|(_, key)| key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    #[allow(dead_code)]
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.values().next().map(String::as_str)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Clear ==
    /// Forgets every key. The clock keeps running.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    /// Iterates keys from least to most recently used.
    #[allow(dead_code)]
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &str> {
        self.order.values().map(String::as_str)
    }
}
