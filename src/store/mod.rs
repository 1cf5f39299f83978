//! Backing-store contracts and implementations.
//!
//! The cache consumes a deliberately narrow interface: [`EntitySource`],
//! a single find operation. Repositories also write, through
//! [`EntityStore`]. [`MemoryStore`] implements both, for tests and for
//! embedders running without a database.

mod memory;

pub use memory::MemoryStore;

use crate::entity::CacheableEntity;
use crate::error::StoreResult;

/// Read side of a backing store; the one operation cache loaders consume.
pub trait EntitySource: Send + Sync + 'static {
    /// Find one record of `E` by key. `Ok(None)` when no record matches.
    fn find_by_key<E: CacheableEntity>(&self, key: &E::Key) -> StoreResult<Option<E>>;
}

/// Full backing-store contract for repositories: reads plus writes.
pub trait EntityStore: EntitySource {
    /// Insert or replace the record for `key`.
    fn upsert<E: CacheableEntity>(&self, key: E::Key, entity: &E) -> StoreResult<()>;

    /// Delete the record for `key`. `Ok(true)` when a record was removed.
    fn remove<E: CacheableEntity>(&self, key: &E::Key) -> StoreResult<bool>;
}

/// Store used when no backing store is configured.
///
/// Reports every key absent. A cache built without a store wires no
/// loader, so in practice this is never consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl NullStore {
    pub fn new() -> Self {
        Self
    }
}

impl EntitySource for NullStore {
    fn find_by_key<E: CacheableEntity>(&self, _key: &E::Key) -> StoreResult<Option<E>> {
        Ok(None)
    }
}
