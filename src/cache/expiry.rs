//! Expiry Module
//!
//! TTL requests and the expiration check shared by lazy and bulk removal.

use std::time::{Duration, Instant};

use crate::error::{CacheError, Result};

// == TTL ==
/// Time-to-live requested for a `set` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the cache's configured default TTL
    #[default]
    Default,
    /// The entry never expires
    Never,
    /// The entry expires this long after it is written
    After(Duration),
}

impl Ttl {
    /// Builds a TTL from a signed millisecond count.
    ///
    /// Zero means never expires; negative values are rejected.
    pub fn from_millis(ms: i64) -> Result<Self> {
        match ms {
            ms if ms < 0 => Err(CacheError::InvalidConfiguration(format!(
                "TTL must not be negative, got {}ms",
                ms
            ))),
            0 => Ok(Ttl::Never),
            ms => Ok(Ttl::After(Duration::from_millis(ms as u64))),
        }
    }
}

impl From<Duration> for Ttl {
    fn from(ttl: Duration) -> Self {
        if ttl.is_zero() {
            Ttl::Never
        } else {
            Ttl::After(ttl)
        }
    }
}

impl From<Option<Duration>> for Ttl {
    fn from(ttl: Option<Duration>) -> Self {
        ttl.map_or(Ttl::Default, Ttl::from)
    }
}

// == Deadline ==
/// Computes the expiration instant for a TTL written at `now`.
///
/// A zero TTL never expires, and so does one too large for the clock.
pub fn deadline(now: Instant, ttl: Duration) -> Option<Instant> {
    if ttl.is_zero() {
        None
    } else {
        now.checked_add(ttl)
    }
}

// == Is Expired ==
/// Checks whether an entry with the given expiration is dead at `now`.
///
/// Boundary condition: the entry is expired once `now >= expires_at`.
pub fn is_expired(expires_at: Option<Instant>, now: Instant) -> bool {
    match expires_at {
        Some(expires) => now >= expires,
        None => false,
    }
}
