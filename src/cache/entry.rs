//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use crate::cache::expiry::{deadline, is_expired};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion or last overwrite time
    pub created_at: Instant,
    /// Expiration time, None = no expiration
    pub expires_at: Option<Instant>,
    /// Last successful read (or write)
    pub last_accessed_at: Instant,
    /// Position in the recency order
    pub(crate) tick: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry written at `now`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Lifetime from `now`; zero means never expires
    /// * `now` - Write time
    /// * `tick` - Recency tick assigned by the tracker
    pub fn new(value: V, ttl: Duration, now: Instant, tick: u64) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: deadline(now, ttl),
            last_accessed_at: now,
            tick,
        }
    }

    // == Is Expired ==
    /// Checks if the entry is dead at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        is_expired(self.expires_at, now)
    }

    // == Touch ==
    /// Records a successful read at `now`.
    pub(crate) fn touch(&mut self, now: Instant, tick: u64) {
        // Instants are monotonic, but keep the invariant explicit
        self.last_accessed_at = now.max(self.created_at);
        self.tick = tick;
    }

    // == Time To Live ==
    /// Returns remaining TTL at `now`, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(now))
    }
}
