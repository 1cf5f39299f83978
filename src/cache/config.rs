//! Cache configuration.

use std::time::Duration;

/// Configuration for a per-type cache instance.
///
/// The default is an eternal reference cache: generous capacity, no
/// time-based expiration. Entities leave the cache through explicit
/// invalidation or capacity pressure, not through a clock.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries per entity type.
    pub max_capacity: u64,

    /// Time-to-live for cache entries.
    /// After this duration, entries are automatically evicted.
    pub ttl: Option<Duration>,

    /// Time-to-idle for cache entries.
    /// Entries are evicted if not accessed within this duration.
    pub tti: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 50_000,
            ttl: None,
            tti: None,
        }
    }
}

impl CacheConfig {
    /// Create a cache config with the given max capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            ..Default::default()
        }
    }

    /// Set max capacity (builder pattern).
    #[must_use]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set time-to-live for cache entries.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }

    /// Set time-to-idle for cache entries.
    #[must_use]
    pub fn tti(mut self, duration: Duration) -> Self {
        self.tti = Some(duration);
        self
    }

    /// Disable all time-based expiration.
    #[must_use]
    pub fn eternal(mut self) -> Self {
        self.ttl = None;
        self.tti = None;
        self
    }

    /// Config for slow-changing lookup tables.
    /// Small capacity, no expiration; rows change through invalidation.
    pub fn reference_data() -> Self {
        Self {
            max_capacity: 5_000,
            ttl: None,
            tti: None,
        }
    }

    /// Config for rows also mutated outside this process.
    /// Bounded staleness through a short TTL.
    pub fn high_churn() -> Self {
        Self {
            max_capacity: 20_000,
            ttl: Some(Duration::from_secs(300)), // 5 minutes
            tti: None,
        }
    }
}
