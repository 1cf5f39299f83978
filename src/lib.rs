//! Mnemosyne - typed entity caching for persistence stacks.
//!
//! A process-wide entity cache segmented by entity type. Per-type caches
//! are built lazily on first access, optionally read through to a backing
//! store on miss, and are invalidated explicitly by the writes around
//! them.
//!
//! ## Architecture
//!
//! - `entity` - entity type tags and the cacheable-entity contract
//! - `cache` - per-type caches, the registry, and the entity cache facade
//! - `store` - backing-store contracts and the in-memory store
//! - `repository` - cache-backed repository wiring
//! - `error` - store and cache error types
//!
//! ## Quick start
//!
//! ```rust
//! use mnemosyne::{CacheConfig, CacheableEntity, EntityCache, EntityType, MokaEntityCache};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl CacheableEntity for User {
//!     type Key = u64;
//!
//!     fn entity_type() -> EntityType {
//!         EntityType::new("users")
//!     }
//! }
//!
//! let cache = MokaEntityCache::new(CacheConfig::default());
//!
//! let user = User { id: 1, name: "ada".to_string() };
//! cache.put::<User>(1, Some(user.clone()));
//!
//! assert!(cache.contains::<User>(&1));
//! assert_eq!(cache.get::<User>(&1).unwrap(), Some(user));
//! ```

pub mod cache;
pub mod entity;
pub mod error;
pub mod repository;
pub mod store;

pub use cache::{CacheConfig, CacheRegistry, EntityCache, Loader, MokaEntityCache, TypedCache};
pub use entity::{CacheableEntity, EntityType};
pub use error::{CacheError, CacheResult, StoreError, StoreResult};
pub use repository::CachedRepository;
pub use store::{EntitySource, EntityStore, MemoryStore, NullStore};
