//! In-memory backing store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::entity::{CacheableEntity, EntityType};
use crate::error::StoreResult;

use super::{EntitySource, EntityStore};

/// One stored row: the encoded entity plus write bookkeeping.
#[derive(Debug, Clone)]
struct StoredRow {
    value: serde_json::Value,
    updated_at: DateTime<Utc>,
}

/// In-memory [`EntityStore`] keeping rows as JSON values.
///
/// Rows are keyed by entity type plus the encoded key, so one store holds
/// heterogeneous entity types side by side. Finds are counted, which lets
/// tests prove that a cache in front of this store absorbs repeat lookups.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<(EntityType, String), StoredRow>>,
    reads: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of find operations served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of stored rows across all entity types.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Drop every row.
    pub fn clear(&self) {
        self.rows.write().clear();
    }

    /// When the row for `key` was last written, if it exists.
    pub fn last_updated<E: CacheableEntity>(
        &self,
        key: &E::Key,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let row_key = Self::row_key::<E>(key)?;
        Ok(self.rows.read().get(&row_key).map(|row| row.updated_at))
    }

    fn row_key<E: CacheableEntity>(key: &E::Key) -> StoreResult<(EntityType, String)> {
        let encoded = serde_json::to_string(key)?;
        Ok((E::entity_type(), encoded))
    }
}

impl EntitySource for MemoryStore {
    fn find_by_key<E: CacheableEntity>(&self, key: &E::Key) -> StoreResult<Option<E>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let row_key = Self::row_key::<E>(key)?;

        let rows = self.rows.read();
        match rows.get(&row_key) {
            Some(row) => {
                let entity = serde_json::from_value(row.value.clone())?;
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }
}

impl EntityStore for MemoryStore {
    fn upsert<E: CacheableEntity>(&self, key: E::Key, entity: &E) -> StoreResult<()> {
        let row_key = Self::row_key::<E>(&key)?;
        let row = StoredRow {
            value: serde_json::to_value(entity)?,
            updated_at: Utc::now(),
        };

        self.rows.write().insert(row_key, row);
        debug!(entity_type = %E::entity_type(), "stored row");
        Ok(())
    }

    fn remove<E: CacheableEntity>(&self, key: &E::Key) -> StoreResult<bool> {
        let row_key = Self::row_key::<E>(key)?;
        let removed = self.rows.write().remove(&row_key).is_some();
        if removed {
            debug!(entity_type = %E::entity_type(), "removed row");
        }
        Ok(removed)
    }
}
