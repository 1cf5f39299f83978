//! Cache registry - one per-type cache per entity type.

use std::any::{Any, TypeId};
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::entity::EntityType;

use super::{CacheConfig, Loader, TypedCache};

/// Central registry mapping entity types to their per-type caches.
///
/// Per-type caches are created lazily on first access. Construction is
/// serialized under a registry-wide mutex, so concurrent first accesses for
/// an unseen type agree on a single cache instance; the map's atomic entry
/// insert backs that up. Steady-state traffic takes no lock beyond the
/// map's own sharding: callers fetch a cheap [`TypedCache`] handle and
/// operate on it directly.
///
/// Cloning the registry is cheap; clones share the same caches.
#[derive(Clone)]
pub struct CacheRegistry {
    caches: Arc<DashMap<EntityType, CacheSlot>>,
    /// Serializes cache construction and `clear`.
    build_lock: Arc<Mutex<()>>,
}

/// Internal slot storing a type-erased cache with enough metadata for a
/// checked downcast.
struct CacheSlot {
    cache: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl CacheSlot {
    fn new<K, V>(cache: TypedCache<K, V>) -> Self
    where
        K: Hash + Eq + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        Self {
            cache: Box::new(cache),
            type_id: TypeId::of::<TypedCache<K, V>>(),
            type_name: std::any::type_name::<TypedCache<K, V>>(),
        }
    }

    /// # Panics
    /// Panics if the slot holds a cache with different key/value types.
    fn downcast<K, V>(&self, entity_type: EntityType) -> TypedCache<K, V>
    where
        K: Hash + Eq + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        if self.type_id != TypeId::of::<TypedCache<K, V>>() {
            panic!(
                "cache type mismatch for '{}': expected {}, got {}",
                entity_type,
                std::any::type_name::<TypedCache<K, V>>(),
                self.type_name
            );
        }
        self.cache
            .downcast_ref::<TypedCache<K, V>>()
            .unwrap()
            .clone()
    }
}

impl CacheRegistry {
    /// Create a new empty cache registry.
    pub fn new() -> Self {
        debug!("cache registry initialized");
        Self {
            caches: Arc::new(DashMap::new()),
            build_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get the cache registered for `entity_type`, without creating one.
    ///
    /// # Panics
    /// Panics if the cache exists but with different key/value types.
    pub fn get<K, V>(&self, entity_type: EntityType) -> Option<TypedCache<K, V>>
    where
        K: Hash + Eq + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.caches
            .get(&entity_type)
            .map(|slot| slot.downcast(entity_type))
    }

    /// Get the cache for `entity_type`, creating it on first access.
    ///
    /// # Panics
    /// Panics if the cache exists but with different key/value types.
    pub fn get_or_create<K, V>(
        &self,
        entity_type: EntityType,
        config: CacheConfig,
    ) -> TypedCache<K, V>
    where
        K: Hash + Eq + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.get_or_build(entity_type, || TypedCache::new(entity_type, config))
    }

    /// Like [`get_or_create`](Self::get_or_create), wiring a loader into
    /// the cache if this call ends up constructing it.
    pub fn get_or_create_with_loader<K, V>(
        &self,
        entity_type: EntityType,
        config: CacheConfig,
        loader: Loader<K, V>,
    ) -> TypedCache<K, V>
    where
        K: Hash + Eq + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.get_or_build(entity_type, || {
            TypedCache::with_loader(entity_type, config, loader)
        })
    }

    fn get_or_build<K, V>(
        &self,
        entity_type: EntityType,
        build: impl FnOnce() -> TypedCache<K, V>,
    ) -> TypedCache<K, V>
    where
        K: Hash + Eq + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        if let Some(cache) = self.get(entity_type) {
            return cache;
        }

        // Losing racers wait here instead of building a second cache; the
        // entry insert below stays the final arbiter either way.
        let _build = self.build_lock.lock();

        let slot = self.caches.entry(entity_type).or_insert_with(|| {
            debug!(%entity_type, "creating per-type cache");
            CacheSlot::new(build())
        });
        slot.downcast(entity_type)
    }

    /// Drop every per-type cache.
    ///
    /// Holds the construction lock, so no new cache can register while the
    /// registry empties. Dropped instances free their entries once the last
    /// outstanding handle goes away.
    pub fn clear(&self) {
        let _build = self.build_lock.lock();
        let dropped = self.caches.len();
        self.caches.clear();
        debug!(dropped, "cleared cache registry");
    }

    /// Check if a cache is registered for `entity_type`.
    pub fn is_registered(&self, entity_type: EntityType) -> bool {
        self.caches.contains_key(&entity_type)
    }

    /// Get the number of registered per-type caches.
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    /// Get the tags of all registered per-type caches.
    pub fn entity_types(&self) -> Vec<EntityType> {
        self.caches.iter().map(|entry| *entry.key()).collect()
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("cache_count", &self.caches.len())
            .field("entity_types", &self.entity_types())
            .finish()
    }
}
