//! Cache-backed repository over an entity store.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{EntityCache, MokaEntityCache};
use crate::entity::CacheableEntity;
use crate::error::{CacheResult, StoreResult};
use crate::store::EntityStore;

/// Repository routing reads through the typed entity cache and writes
/// through to the backing store.
///
/// `find` is a single cache `get`: the cache's loader, wired from the same
/// store, makes it read-through. `save` and `delete` keep the cache
/// coherent with the store.
pub struct CachedRepository<E, S>
where
    E: CacheableEntity,
    S: EntityStore,
{
    store: Arc<S>,
    cache: Arc<MokaEntityCache<S>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S> CachedRepository<E, S>
where
    E: CacheableEntity,
    S: EntityStore,
{
    /// Build a repository over `store` and a cache already wired to it.
    pub fn new(store: Arc<S>, cache: Arc<MokaEntityCache<S>>) -> Self {
        Self {
            store,
            cache,
            _entity: PhantomData,
        }
    }

    /// Fetch by key: cache first, then the backing store on miss.
    pub fn find(&self, key: &E::Key) -> CacheResult<Option<E>> {
        self.cache.get::<E>(key)
    }

    /// Persist `entity` and refresh its cached value.
    pub fn save(&self, key: E::Key, entity: &E) -> StoreResult<()> {
        self.store.upsert::<E>(key.clone(), entity)?;
        self.cache.put::<E>(key, Some(entity.clone()));
        Ok(())
    }

    /// Delete by key, dropping any cached value. `Ok(true)` when the store
    /// had a record.
    pub fn delete(&self, key: &E::Key) -> StoreResult<bool> {
        let removed = self.store.remove::<E>(key)?;
        self.cache.invalidate::<E>(key);
        if removed {
            debug!(entity_type = %E::entity_type(), "deleted entity");
        }
        Ok(removed)
    }

    /// Whether a value for `key` is currently cached. No store access.
    pub fn is_cached(&self, key: &E::Key) -> bool {
        self.cache.contains::<E>(key)
    }
}

// Manual Clone: E and S need no Clone of their own.
impl<E, S> Clone for CachedRepository<E, S>
where
    E: CacheableEntity,
    S: EntityStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            _entity: PhantomData,
        }
    }
}
