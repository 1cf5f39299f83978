//! Typed per-entity-type cache wrapper around Moka.

use std::hash::Hash;
use std::sync::Arc;

use moka::sync::Cache;
use tracing::debug;

use crate::entity::EntityType;
use crate::error::{CacheError, CacheResult, StoreError};

use super::CacheConfig;

/// Loader invoked on a cache miss to fetch the value from a backing store.
///
/// `Ok(None)` means the store has no such record; nothing is cached in
/// that case. Errors propagate to the `get` caller.
pub type Loader<K, V> = Arc<dyn Fn(&K) -> Result<Option<V>, StoreError> + Send + Sync>;

/// Error channel for the fallible init closure. Absent rides the error
/// side so Moka never caches it.
enum LoadError {
    Absent,
    Store(StoreError),
}

/// A cache holding a single entity type.
///
/// This cache is:
/// - Thread-safe (uses Arc internally)
/// - LRU-based with optional TTL/TTI
/// - Clone-friendly (cloning is cheap, shares the same underlying cache)
///
/// When built with a loader, a `get` miss becomes a backing-store read;
/// concurrent misses for the same key are coalesced into a single load.
pub struct TypedCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Cache<K, V>>,
    entity_type: EntityType,
    loader: Option<Loader<K, V>>,
}

// Clones share the underlying cache and loader.
impl<K, V> Clone for TypedCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            entity_type: self.entity_type,
            loader: self.loader.clone(),
        }
    }
}

impl<K, V> TypedCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache for `entity_type` with the given config.
    pub fn new(entity_type: EntityType, config: CacheConfig) -> Self {
        Self::build(entity_type, config, None)
    }

    /// Create a cache whose misses read through to a backing store.
    pub fn with_loader(entity_type: EntityType, config: CacheConfig, loader: Loader<K, V>) -> Self {
        Self::build(entity_type, config, Some(loader))
    }

    fn build(entity_type: EntityType, config: CacheConfig, loader: Option<Loader<K, V>>) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_capacity);

        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        if let Some(tti) = config.tti {
            builder = builder.time_to_idle(tti);
        }

        Self {
            inner: Arc::new(builder.build()),
            entity_type,
            loader,
        }
    }

    /// The entity type this cache holds.
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Whether this cache reads through to a backing store on miss.
    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    /// Insert a key-value pair into the cache.
    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Get the value for `key`.
    ///
    /// Without a loader this is a plain lookup. With one, a miss becomes a
    /// backing-store read whose result is cached when a record exists. A
    /// plain miss is `Ok(None)`; the only error path is a loader failure.
    pub fn get(&self, key: &K) -> CacheResult<Option<V>> {
        let loader = match &self.loader {
            Some(loader) => loader,
            None => return Ok(self.inner.get(key)),
        };

        let loaded = self.inner.try_get_with(key.clone(), || {
            debug!(entity_type = %self.entity_type, "cache miss, reading backing store");
            match loader(key) {
                Ok(Some(value)) => Ok(value),
                Ok(None) => Err(LoadError::Absent),
                Err(err) => Err(LoadError::Store(err)),
            }
        });

        match loaded {
            Ok(value) => Ok(Some(value)),
            Err(err) => match &*err {
                LoadError::Absent => Ok(None),
                LoadError::Store(store_err) => Err(CacheError::Load {
                    entity_type: self.entity_type,
                    source: store_err.clone(),
                }),
            },
        }
    }

    /// Check if a key has a cached value. Never consults the loader.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Remove a key from the cache.
    pub fn invalidate(&self, key: &K) {
        self.inner.invalidate(key);
    }

    /// Remove all entries from the cache. The cache itself stays usable.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
        debug!(entity_type = %self.entity_type, "invalidated all entries");
    }

    /// Get the number of entries in the cache.
    ///
    /// Note: This may not be perfectly accurate due to concurrent operations.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Flush pending internal maintenance so `entry_count` is exact.
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }
}

impl<K, V> std::fmt::Debug for TypedCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCache")
            .field("entity_type", &self.entity_type)
            .field("entry_count", &self.inner.entry_count())
            .field("has_loader", &self.loader.is_some())
            .finish()
    }
}
