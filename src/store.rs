//! Entity store: latest snapshot of each resource collection
//!
//! Collections are replaced wholesale on every successful fetch; there is no
//! incremental merge. A failed fetch leaves the previous snapshot in place.
//! `load_many` is the join-before-use barrier: all requested fetches run
//! concurrently and the snapshots install together only once every one of
//! them succeeded, so a projection pass never crosses a fresh collection
//! with a stale sibling.

use crate::entity::{Collection, Entity, Resource};
use crate::error::FetchResult;
use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Source of raw entity collections. Production uses the HTTP client; tests
/// inject an in-memory implementation.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the entire resource. The API has no server-side filtering
    /// contract to rely on, so this is always the full flat array.
    async fn fetch_all(&self, resource: Resource) -> FetchResult<Vec<Entity>>;
}

/// Immutable view of the store taken at one instant.
///
/// Resolution and projection run against a snapshot, never against the live
/// store, so a concurrent refresh cannot change the data mid-pass.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    collections: HashMap<Resource, Collection>,
}

impl StoreSnapshot {
    /// The collection for a resource, or `None` if it has never loaded.
    pub fn collection(&self, resource: Resource) -> Option<&Collection> {
        self.collections.get(&resource)
    }

    pub fn is_loaded(&self, resource: Resource) -> bool {
        self.collections.contains_key(&resource)
    }
}

pub struct EntityStore {
    fetcher: Arc<dyn ResourceFetcher>,
    collections: RwLock<HashMap<Resource, Collection>>,
    // Ticket counter: a refresh that was superseded by a newer one must not
    // install its (older) results over the newer snapshot.
    generation: AtomicU64,
}

impl EntityStore {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        EntityStore {
            fetcher,
            collections: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch one resource and replace its snapshot atomically.
    ///
    /// On error the previous snapshot is retained and the error propagates
    /// to the caller; nothing partial is ever installed.
    pub async fn load(&self, resource: Resource) -> FetchResult<Collection> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let entities = self.fetcher.fetch_all(resource).await?;
        let collection: Collection = Arc::new(entities);

        self.install(ticket, vec![(resource, Arc::clone(&collection))]);
        Ok(collection)
    }

    /// Fetch several resources concurrently, fail fast on the first error,
    /// and install all snapshots together once every fetch succeeded.
    pub async fn load_many(&self, resources: &[Resource]) -> FetchResult<()> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(?resources, "loading resource collections");

        let fetches = resources.iter().map(|&resource| {
            let fetcher = Arc::clone(&self.fetcher);
            async move {
                let entities = fetcher.fetch_all(resource).await?;
                Ok::<_, crate::error::FetchError>((resource, Arc::new(entities) as Collection))
            }
        });

        let loaded = try_join_all(fetches).await?;
        for (resource, collection) in &loaded {
            info!(%resource, count = collection.len(), "collection refreshed");
        }
        self.install(ticket, loaded);
        Ok(())
    }

    /// Consistent view of everything currently loaded.
    pub fn snapshot(&self) -> StoreSnapshot {
        let guard = self.collections.read().expect("store lock poisoned");
        StoreSnapshot {
            collections: guard.clone(),
        }
    }

    /// The current snapshot of one resource, if it has ever loaded.
    pub fn collection(&self, resource: Resource) -> Option<Collection> {
        let guard = self.collections.read().expect("store lock poisoned");
        guard.get(&resource).cloned()
    }

    fn install(&self, ticket: u64, loaded: Vec<(Resource, Collection)>) {
        // Last-write-wins: if a newer refresh started while this one was in
        // flight, its results are authoritative and ours are dropped. The
        // ticket must be checked while holding the write lock, otherwise a
        // newer refresh could slip in between the check and the insert and
        // get overwritten by these stale collections.
        let mut guard = self.collections.write().expect("store lock poisoned");
        if self.generation.load(Ordering::SeqCst) != ticket {
            warn!(ticket, "refresh superseded by a newer one; discarding results");
            return;
        }
        for (resource, collection) in loaded {
            guard.insert(resource, collection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scriptable fetcher: per-resource payloads, optional failures.
    pub struct ScriptedFetcher {
        payloads: Mutex<HashMap<Resource, Result<Vec<Entity>, u16>>>,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            ScriptedFetcher {
                payloads: Mutex::new(HashMap::new()),
            }
        }

        pub fn set(&self, resource: Resource, items: Vec<serde_json::Value>) {
            let entities = items
                .into_iter()
                .map(|v| match v {
                    serde_json::Value::Object(map) => Entity::from_object(map),
                    _ => panic!("test payloads must be objects"),
                })
                .collect();
            self.payloads
                .lock()
                .unwrap()
                .insert(resource, Ok(entities));
        }

        pub fn fail(&self, resource: Resource, status: u16) {
            self.payloads
                .lock()
                .unwrap()
                .insert(resource, Err(status));
        }

        pub fn with(self, resource: Resource, items: Vec<serde_json::Value>) -> Self {
            self.set(resource, items);
            self
        }

        pub fn failing(self, resource: Resource, status: u16) -> Self {
            self.fail(resource, status);
            self
        }
    }

    #[async_trait]
    impl ResourceFetcher for ScriptedFetcher {
        async fn fetch_all(&self, resource: Resource) -> FetchResult<Vec<Entity>> {
            match self.payloads.lock().unwrap().get(&resource) {
                Some(Ok(entities)) => Ok(entities.clone()),
                Some(Err(status)) => Err(FetchError::Status {
                    resource,
                    status: *status,
                }),
                None => Ok(vec![]),
            }
        }
    }

    #[tokio::test]
    async fn load_replaces_the_snapshot_wholesale() {
        let fetcher = ScriptedFetcher::new().with(
            Resource::Clients,
            vec![json!({"id": 1, "nombre": "Ana"}), json!({"id": 2, "nombre": "Luis"})],
        );
        let store = EntityStore::new(Arc::new(fetcher));

        let coll = store.load(Resource::Clients).await.unwrap();
        assert_eq!(coll.len(), 2);
        assert!(store.snapshot().is_loaded(Resource::Clients));
    }

    #[tokio::test]
    async fn failed_load_retains_previous_snapshot() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .with(Resource::Clients, vec![json!({"id": 1, "nombre": "Ana"})]),
        );
        let store = EntityStore::new(Arc::clone(&fetcher) as Arc<dyn ResourceFetcher>);
        store.load(Resource::Clients).await.unwrap();

        fetcher.fail(Resource::Clients, 500);
        let err = store.load(Resource::Clients).await.unwrap_err();
        assert_eq!(err.resource(), Resource::Clients);

        // Previous snapshot is still served.
        let coll = store.collection(Resource::Clients).unwrap();
        assert_eq!(coll.len(), 1);
    }

    #[tokio::test]
    async fn load_many_is_all_or_nothing() {
        let fetcher = ScriptedFetcher::new()
            .with(Resource::Clients, vec![json!({"id": 9})])
            .failing(Resource::Requests, 500);
        let store = EntityStore::new(Arc::new(fetcher));

        let err = store
            .load_many(&[Resource::Clients, Resource::Requests])
            .await
            .unwrap_err();
        assert_eq!(err.resource(), Resource::Requests);
        // The successful clients fetch was not installed either.
        assert!(!store.snapshot().is_loaded(Resource::Clients));
        assert!(!store.snapshot().is_loaded(Resource::Requests));
    }

    #[tokio::test]
    async fn load_many_installs_all_collections_together() {
        let fetcher = ScriptedFetcher::new()
            .with(Resource::Clients, vec![json!({"id": 1, "nombre": "Ana"})])
            .with(Resource::Requests, vec![json!({"id": 5, "cliente_id": 1})]);
        let store = EntityStore::new(Arc::new(fetcher));

        store
            .load_many(&[Resource::Clients, Resource::Requests])
            .await
            .unwrap();
        let snap = store.snapshot();
        assert_eq!(snap.collection(Resource::Clients).unwrap().len(), 1);
        assert_eq!(snap.collection(Resource::Requests).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn superseded_refresh_does_not_overwrite_newer_snapshot() {
        let fetcher = ScriptedFetcher::new()
            .with(Resource::Clients, vec![json!({"id": 1, "nombre": "Ana"})]);
        let store = EntityStore::new(Arc::new(fetcher));

        // A refresh takes its ticket, then stalls before installing.
        let stale_ticket = store.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // A newer refresh starts and completes in the meantime.
        store.load(Resource::Clients).await.unwrap();

        // The stalled refresh finally installs; its results must be dropped.
        store.install(stale_ticket, vec![(Resource::Clients, Arc::new(vec![]))]);
        let coll = store.collection(Resource::Clients).unwrap();
        assert_eq!(coll.len(), 1);
    }

    #[tokio::test]
    async fn never_loaded_resource_is_absent_from_snapshot() {
        let store = EntityStore::new(Arc::new(ScriptedFetcher::new()));
        assert!(store.collection(Resource::Reviews).is_none());
        assert!(!store.snapshot().is_loaded(Resource::Reviews));
    }
}
