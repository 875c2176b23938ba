//! Cache configuration.

use std::time::Duration;

use crate::store::NO_CACHING_TTL;

/// Configuration for a cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_capacity: u64,

    /// Time-to-live for cache entries.
    pub ttl: Option<Duration>,

    /// Time-to-idle for cache entries.
    pub tti: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Some(Duration::from_secs(300)), // 5 minutes
            tti: None,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with the given max capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            ..Default::default()
        }
    }

    /// Set time-to-live for cache entries.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }

    /// Cap the lifetime of every entry at [`NO_CACHING_TTL`] when `enabled`.
    #[must_use]
    pub fn no_caching(mut self, enabled: bool) -> Self {
        if enabled {
            self.ttl = Some(self.ttl.map_or(NO_CACHING_TTL, |ttl| ttl.min(NO_CACHING_TTL)));
            self.tti = None;
        }
        self
    }

    /// Catalogue data edited only by admin commands.
    /// Low capacity, long TTL.
    pub fn reference_data() -> Self {
        Self {
            max_capacity: 5_000,
            ttl: Some(Duration::from_secs(1800)), // 30 minutes
            tti: None,
        }
    }

    /// Per-chat settings read on every draw.
    pub fn chat_settings() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Some(Duration::from_secs(600)), // 10 minutes
            tti: Some(Duration::from_secs(300)),
        }
    }
}
