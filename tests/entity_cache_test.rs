//! End-to-end behavior of the typed entity cache.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use mnemosyne::{
    CacheConfig, CacheError, CacheableEntity, EntityCache, EntitySource, EntityStore, MemoryStore,
    MokaEntityCache, StoreError, StoreResult,
};

use common::{ROLES, Role, USERS, User};

fn seed_user(store: &MemoryStore, user: &User) {
    store.upsert::<User>(user.id, user).unwrap();
}

#[test]
fn test_unknown_keys_are_absent_not_errors() {
    common::init_tracing();
    let cache = MokaEntityCache::new(CacheConfig::default());

    assert!(!cache.contains::<User>(&42));
    assert_eq!(cache.get::<User>(&42).unwrap(), None);
}

#[test]
fn test_put_then_lookup_round_trips() {
    let cache = MokaEntityCache::new(CacheConfig::default());
    let ada = User::new(1, "ada");

    cache.put::<User>(1, Some(ada.clone()));

    assert!(cache.contains::<User>(&1));
    assert_eq!(cache.get::<User>(&1).unwrap(), Some(ada));
}

#[test]
fn test_putting_none_drops_the_entry() {
    let cache = MokaEntityCache::new(CacheConfig::default());
    cache.put::<User>(1, Some(User::new(1, "ada")));

    cache.put::<User>(1, None);

    assert!(!cache.contains::<User>(&1));
    assert_eq!(cache.get::<User>(&1).unwrap(), None);
}

#[test]
fn test_invalidating_one_key_leaves_the_rest() {
    let cache = MokaEntityCache::new(CacheConfig::default());
    cache.put::<User>(1, Some(User::new(1, "ada")));
    cache.put::<User>(2, Some(User::new(2, "grace")));

    cache.invalidate::<User>(&1);

    assert!(!cache.contains::<User>(&1));
    assert!(cache.contains::<User>(&2));
}

#[test]
fn test_invalidating_a_type_leaves_other_types() {
    let cache = MokaEntityCache::new(CacheConfig::default());
    cache.put::<User>(1, Some(User::new(1, "ada")));
    cache.put::<User>(2, Some(User::new(2, "grace")));
    cache.put::<Role>("admin".to_string(), Some(Role::new("admin", 10)));

    cache.invalidate_type::<User>();

    assert!(!cache.contains::<User>(&1));
    assert!(!cache.contains::<User>(&2));
    assert!(cache.contains::<Role>(&"admin".to_string()));

    // The user cache stays registered and usable.
    assert!(cache.registry().is_registered(USERS));
    cache.put::<User>(3, Some(User::new(3, "edsger")));
    assert!(cache.contains::<User>(&3));
}

#[test]
fn test_clear_empties_every_type() {
    let cache = MokaEntityCache::new(CacheConfig::default());
    cache.put::<User>(1, Some(User::new(1, "ada")));
    cache.put::<Role>("admin".to_string(), Some(Role::new("admin", 10)));
    assert!(cache.registry().is_registered(USERS));
    assert!(cache.registry().is_registered(ROLES));

    cache.clear();

    assert!(cache.registry().is_empty());
    assert!(!cache.contains::<User>(&1));
    assert!(!cache.contains::<Role>(&"admin".to_string()));
    assert_eq!(cache.get::<User>(&1).unwrap(), None);
}

/// The end-to-end scenario a persistence layer runs through: populate two
/// entity types, invalidate one type wholesale, and watch the other keep
/// serving hits.
#[test]
fn test_type_scoped_invalidation_scenario() {
    let cache = MokaEntityCache::new(CacheConfig::default());

    for id in 0..10 {
        cache.put::<User>(id, Some(User::new(id, "user")));
    }
    cache.put::<Role>("admin".to_string(), Some(Role::new("admin", 10)));
    cache.put::<Role>("auditor".to_string(), Some(Role::new("auditor", 5)));

    cache.invalidate_type::<User>();

    for id in 0..10 {
        assert_eq!(cache.get::<User>(&id).unwrap(), None);
    }
    assert_eq!(
        cache.get::<Role>(&"admin".to_string()).unwrap(),
        Some(Role::new("admin", 10))
    );
    assert_eq!(
        cache.get::<Role>(&"auditor".to_string()).unwrap(),
        Some(Role::new("auditor", 5))
    );

    // Roles survive until a full clear.
    cache.clear();
    assert!(!cache.contains::<Role>(&"admin".to_string()));
    assert!(!cache.contains::<Role>(&"auditor".to_string()));
}

#[test]
fn test_concurrent_puts_for_distinct_types() {
    let cache = Arc::new(MokaEntityCache::new(CacheConfig::default()));

    let users = Arc::clone(&cache);
    let writer_a = thread::spawn(move || {
        users.put::<User>(42, Some(User::new(42, "ada")));
    });

    let roles = Arc::clone(&cache);
    let writer_b = thread::spawn(move || {
        roles.put::<Role>("auditor".to_string(), Some(Role::new("auditor", 5)));
    });

    writer_a.join().unwrap();
    writer_b.join().unwrap();

    assert_eq!(cache.registry().len(), 2);
    assert_eq!(cache.get::<User>(&42).unwrap(), Some(User::new(42, "ada")));
    assert_eq!(
        cache.get::<Role>(&"auditor".to_string()).unwrap(),
        Some(Role::new("auditor", 5))
    );
}

#[test]
fn test_concurrent_writers_see_one_cache_per_type() {
    let cache = Arc::new(MokaEntityCache::new(CacheConfig::default()));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..50 {
                    let id = worker * 100 + i;
                    cache.put::<User>(id, Some(User::new(id, "user")));
                    cache.put::<Role>(format!("role-{id}"), Some(Role::new("role", 1)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Two per-type caches total, each holding every write.
    assert_eq!(cache.registry().len(), 2);
    for worker in 0..8 {
        for i in 0..50 {
            let id = worker * 100 + i;
            assert!(cache.contains::<User>(&id));
            assert!(cache.contains::<Role>(&format!("role-{id}")));
        }
    }
}

#[test]
fn test_miss_reads_through_to_the_store() {
    let store = Arc::new(MemoryStore::new());
    seed_user(&store, &User::new(7, "ada"));

    let cache = MokaEntityCache::with_store(CacheConfig::default(), Arc::clone(&store));

    assert_eq!(cache.get::<User>(&7).unwrap(), Some(User::new(7, "ada")));
    assert_eq!(store.read_count(), 1);
    assert!(cache.contains::<User>(&7));
}

#[test]
fn test_repeat_gets_do_not_touch_the_store() {
    let store = Arc::new(MemoryStore::new());
    seed_user(&store, &User::new(7, "ada"));

    let cache = MokaEntityCache::with_store(CacheConfig::default(), Arc::clone(&store));

    for _ in 0..5 {
        assert_eq!(cache.get::<User>(&7).unwrap(), Some(User::new(7, "ada")));
    }
    assert_eq!(store.read_count(), 1);
}

#[test]
fn test_absent_store_rows_are_not_negatively_cached() {
    let store = Arc::new(MemoryStore::new());
    let cache = MokaEntityCache::with_store(CacheConfig::default(), Arc::clone(&store));

    assert_eq!(cache.get::<User>(&99).unwrap(), None);
    assert_eq!(cache.get::<User>(&99).unwrap(), None);

    // Each miss consulted the store; nothing was pinned for the key.
    assert_eq!(store.read_count(), 2);
    assert!(!cache.contains::<User>(&99));
}

#[test]
fn test_explicit_put_overrides_the_store() {
    let store = Arc::new(MemoryStore::new());
    seed_user(&store, &User::new(7, "ada"));

    let cache = MokaEntityCache::with_store(CacheConfig::default(), Arc::clone(&store));
    cache.put::<User>(7, Some(User::new(7, "renamed")));

    assert_eq!(
        cache.get::<User>(&7).unwrap(),
        Some(User::new(7, "renamed"))
    );
    assert_eq!(store.read_count(), 0);
}

#[test]
fn test_invalidation_forces_a_fresh_store_read() {
    let store = Arc::new(MemoryStore::new());
    seed_user(&store, &User::new(7, "ada"));

    let cache = MokaEntityCache::with_store(CacheConfig::default(), Arc::clone(&store));
    assert!(cache.get::<User>(&7).unwrap().is_some());
    assert_eq!(store.read_count(), 1);

    seed_user(&store, &User::new(7, "updated"));
    cache.invalidate::<User>(&7);

    assert_eq!(
        cache.get::<User>(&7).unwrap(),
        Some(User::new(7, "updated"))
    );
    assert_eq!(store.read_count(), 2);
}

/// Store double that holds each find open. The delay keeps a load in
/// flight long enough for concurrent misses on the same key to pile up
/// behind it instead of each reading the store themselves.
struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

impl SlowStore {
    fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
        }
    }
}

impl EntitySource for SlowStore {
    fn find_by_key<E: CacheableEntity>(&self, key: &E::Key) -> StoreResult<Option<E>> {
        thread::sleep(self.delay);
        self.inner.find_by_key::<E>(key)
    }
}

#[test]
fn test_concurrent_misses_coalesce_into_one_load() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(100)));
    store.inner.upsert::<User>(7, &User::new(7, "ada")).unwrap();

    let cache = Arc::new(MokaEntityCache::with_store(
        CacheConfig::default(),
        Arc::clone(&store),
    ));
    let barrier = Arc::new(Barrier::new(4));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get::<User>(&7).unwrap()
            })
        })
        .collect();

    for reader in readers {
        assert_eq!(reader.join().unwrap(), Some(User::new(7, "ada")));
    }
    assert_eq!(store.inner.read_count(), 1);
}

struct FailingSource {
    calls: AtomicUsize,
    delay: Duration,
}

impl FailingSource {
    fn new() -> Self {
        Self::stalled(Duration::ZERO)
    }

    fn stalled(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EntitySource for FailingSource {
    fn find_by_key<E: CacheableEntity>(&self, _key: &E::Key) -> StoreResult<Option<E>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}

#[test]
fn test_store_failures_propagate_from_get() {
    let store = Arc::new(FailingSource::new());
    let cache = MokaEntityCache::with_store(CacheConfig::default(), Arc::clone(&store));

    let err = cache.get::<User>(&1).unwrap_err();
    let CacheError::Load {
        entity_type,
        source,
    } = err;

    assert_eq!(entity_type, USERS);
    assert_eq!(source, StoreError::Unavailable("store offline".to_string()));
    assert_eq!(store.call_count(), 1);

    // The failure is not cached; presence still reports false.
    assert!(!cache.contains::<User>(&1));
}

#[test]
fn test_coalesced_waiters_observe_one_failure() {
    let store = Arc::new(FailingSource::stalled(Duration::from_millis(100)));
    let cache = Arc::new(MokaEntityCache::with_store(
        CacheConfig::default(),
        Arc::clone(&store),
    ));
    let barrier = Arc::new(Barrier::new(4));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get::<User>(&1).unwrap_err()
            })
        })
        .collect();

    for reader in readers {
        let CacheError::Load {
            entity_type,
            source,
        } = reader.join().unwrap();
        assert_eq!(entity_type, USERS);
        assert_eq!(source, StoreError::Unavailable("store offline".to_string()));
    }

    // One in-flight load served every waiter; nobody retried on their own.
    assert_eq!(store.call_count(), 1);
}

