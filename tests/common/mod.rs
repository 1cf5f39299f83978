//! Shared fixtures for integration tests.
//!
//! Not every binary uses every fixture.
#![allow(dead_code)]

use mnemosyne::{CacheableEntity, EntityType};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

/// Install the test tracing subscriber once per test binary.
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

pub const USERS: EntityType = EntityType::new("users");
pub const ROLES: EntityType = EntityType::new("roles");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: format!("{name}@example.com"),
        }
    }
}

impl CacheableEntity for User {
    type Key = u64;

    fn entity_type() -> EntityType {
        USERS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub level: u8,
}

impl Role {
    pub fn new(name: &str, level: u8) -> Self {
        Self {
            name: name.to_string(),
            level,
        }
    }
}

impl CacheableEntity for Role {
    type Key = String;

    fn entity_type() -> EntityType {
        ROLES
    }
}
