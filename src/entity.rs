//! Entity type tags and the contract for cacheable entities.

use std::fmt;
use std::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Identifies one logical entity type.
///
/// Tags are lightweight and `Copy`, meant to be declared as constants at
/// the persistence boundary:
///
/// ```rust
/// use mnemosyne::EntityType;
///
/// const USERS: EntityType = EntityType::new("users");
/// assert_eq!(USERS.name(), "users");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityType(&'static str);

impl EntityType {
    /// Create a tag with the given name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The tag's name.
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Contract for entities that can live in the typed cache.
///
/// Caches hold values and keys directly; the serde bounds exist for the
/// store side, where rows and keys are encoded for persistence.
pub trait CacheableEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Key uniquely identifying one record of this entity type.
    type Key: Hash + Eq + Clone + Serialize + Send + Sync + 'static;

    /// The type tag this entity is cached under.
    fn entity_type() -> EntityType;
}
