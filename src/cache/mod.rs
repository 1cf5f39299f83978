//! Cache module - per-type caches, their registry, and the entity facade.
//!
//! ## Architecture
//!
//! The cache system follows a registry pattern:
//! - `CacheRegistry` - process-wide map from entity type to per-type cache
//! - `TypedCache` - one Moka-backed cache holding a single entity type
//! - `CacheConfig` - construction template shared by per-type caches
//! - `MokaEntityCache` - the `EntityCache` implementation embedders hold
//!
//! Per-type caches are created lazily on first access; creation is safe
//! under concurrency and yields exactly one instance per type. Entries do
//! not expire by default. Invalidation is explicit, driven by the writes
//! around the cache.

mod config;
mod entity_cache;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use entity_cache::{EntityCache, MokaEntityCache};
pub use registry::CacheRegistry;
pub use typed::{Loader, TypedCache};
