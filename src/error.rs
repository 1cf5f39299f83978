//! Error types for cache and store operations.

use thiserror::Error;

use crate::entity::EntityType;

/// Result alias for backing-store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result alias for cache retrieval.
pub type CacheResult<T> = Result<T, CacheError>;

/// Failures raised by a backing store.
///
/// Variants carry rendered messages rather than source errors so the type
/// stays cloneable: a coalesced load can surface one failure to several
/// waiting callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A row or key could not be encoded or decoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The store rejected or failed the operation.
    #[error("backing store failure: {0}")]
    Backend(String),

    /// The store could not be reached.
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Failures surfaced by cache retrieval.
///
/// A plain miss is not an error; `get` reports it as `Ok(None)`. The only
/// failure path is a loader reading the backing store on a miss.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The per-type loader failed to read the backing store.
    #[error("loading '{entity_type}' entity from the backing store failed")]
    Load {
        entity_type: EntityType,
        #[source]
        source: StoreError,
    },
}
