//! The entity cache contract and its Moka-backed implementation.

use std::sync::Arc;

use crate::entity::CacheableEntity;
use crate::error::CacheResult;
use crate::store::{EntitySource, NullStore};

use super::{CacheConfig, CacheRegistry, Loader, TypedCache};

/// Entity-instance cache an embedding persistence layer programs against.
///
/// Storage is segmented by entity type; within a type, entries are keyed
/// by the entity's own key. Methods are generic over the entity, so the
/// trait is not object-safe. Embedders hold a concrete cache (usually
/// [`MokaEntityCache`]) or stay generic over `C: EntityCache`.
pub trait EntityCache: Send + Sync {
    /// Whether a value is cached for `key`. Never creates the per-type
    /// cache and never consults a loader.
    fn contains<E: CacheableEntity>(&self, key: &E::Key) -> bool;

    /// Fetch the cached value for `key`, creating the per-type cache on
    /// first access. With a backing store configured, a miss reads through
    /// to it; store failures are the only error path.
    fn get<E: CacheableEntity>(&self, key: &E::Key) -> CacheResult<Option<E>>;

    /// Cache `value` under `key`. `None` behaves as
    /// [`invalidate`](Self::invalidate): no absent marker is ever stored.
    fn put<E: CacheableEntity>(&self, key: E::Key, value: Option<E>);

    /// Drop the entry for `key`, if `E`'s cache and the entry both exist.
    fn invalidate<E: CacheableEntity>(&self, key: &E::Key);

    /// Drop every cached entry of `E`'s type. The per-type cache itself
    /// stays registered.
    fn invalidate_type<E: CacheableEntity>(&self);

    /// Drop every per-type cache, leaving the registry empty.
    fn clear(&self);
}

/// Moka-backed [`EntityCache`] with one cache instance per entity type.
///
/// Per-type caches are built lazily from a single [`CacheConfig`]
/// template. When constructed with a backing store, each new per-type
/// cache gets a loader so `get` misses become store reads.
pub struct MokaEntityCache<S = NullStore> {
    registry: CacheRegistry,
    template: CacheConfig,
    store: Option<Arc<S>>,
}

impl MokaEntityCache<NullStore> {
    /// Cache with no backing store: misses are plain misses.
    pub fn new(template: CacheConfig) -> Self {
        Self {
            registry: CacheRegistry::new(),
            template,
            store: None,
        }
    }
}

impl Default for MokaEntityCache<NullStore> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<S: EntitySource> MokaEntityCache<S> {
    /// Cache whose misses read through to `store`.
    pub fn with_store(template: CacheConfig, store: Arc<S>) -> Self {
        Self {
            registry: CacheRegistry::new(),
            template,
            store: Some(store),
        }
    }

    /// The registry backing this cache.
    pub fn registry(&self) -> &CacheRegistry {
        &self.registry
    }

    /// Look up the per-type cache without creating it.
    fn peek<E: CacheableEntity>(&self) -> Option<TypedCache<E::Key, E>> {
        self.registry.get(E::entity_type())
    }

    /// Look up or lazily build the per-type cache, wiring a loader when a
    /// backing store is configured.
    fn cache_for<E: CacheableEntity>(&self) -> TypedCache<E::Key, E> {
        if let Some(cache) = self.peek::<E>() {
            return cache;
        }

        match &self.store {
            Some(store) => {
                let store = Arc::clone(store);
                let loader: Loader<E::Key, E> = Arc::new(move |key| store.find_by_key::<E>(key));
                self.registry
                    .get_or_create_with_loader(E::entity_type(), self.template.clone(), loader)
            }
            None => self
                .registry
                .get_or_create(E::entity_type(), self.template.clone()),
        }
    }
}

impl<S: EntitySource> EntityCache for MokaEntityCache<S> {
    fn contains<E: CacheableEntity>(&self, key: &E::Key) -> bool {
        self.peek::<E>().is_some_and(|cache| cache.contains(key))
    }

    fn get<E: CacheableEntity>(&self, key: &E::Key) -> CacheResult<Option<E>> {
        self.cache_for::<E>().get(key)
    }

    fn put<E: CacheableEntity>(&self, key: E::Key, value: Option<E>) {
        match value {
            Some(value) => self.cache_for::<E>().insert(key, value),
            None => self.invalidate::<E>(&key),
        }
    }

    fn invalidate<E: CacheableEntity>(&self, key: &E::Key) {
        if let Some(cache) = self.peek::<E>() {
            cache.invalidate(key);
        }
    }

    fn invalidate_type<E: CacheableEntity>(&self) {
        if let Some(cache) = self.peek::<E>() {
            cache.invalidate_all();
        }
    }

    fn clear(&self) {
        self.registry.clear();
    }
}

impl<S> Clone for MokaEntityCache<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            template: self.template.clone(),
            store: self.store.clone(),
        }
    }
}

impl<S> std::fmt::Debug for MokaEntityCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaEntityCache")
            .field("registry", &self.registry)
            .field("has_store", &self.store.is_some())
            .finish()
    }
}
