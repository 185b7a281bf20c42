//! Per-environment cache of entity definitions.
//!
//! Three layers: an in-memory shared future (collapses concurrent loads into
//! one fetch), the persistent store keyed by origin, then the Web API.

use super::storage::{metadata_key, read_json, write_json, KeyValueStore};
use crate::domain::host::HostApi;
use crate::domain::matcher::sort_by_display_name;
use crate::domain::models::EntityInfo;
use crate::error::HostError;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type EntityList = Arc<Vec<EntityInfo>>;

type MetadataFuture = Shared<BoxFuture<'static, Result<EntityList, HostError>>>;

#[derive(Debug, Serialize, Deserialize)]
struct CachedMetadata {
    fetched_at: DateTime<Utc>,
    entities: Vec<EntityInfo>,
}

pub struct EntityMetadataCache {
    host: Arc<dyn HostApi>,
    store: Arc<dyn KeyValueStore>,
    slot: Mutex<Option<MetadataFuture>>,
}

impl EntityMetadataCache {
    pub fn new(host: Arc<dyn HostApi>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            host,
            store,
            slot: Mutex::new(None),
        }
    }

    /// Entity definitions sorted by display name.
    ///
    /// Without `force`, an in-flight or completed load is reused. With
    /// `force`, both caches are bypassed and overwritten. A failed load is
    /// forgotten so the next call retries.
    pub async fn load(&self, force: bool) -> Result<EntityList, HostError> {
        let future = {
            let mut slot = self.slot.lock();
            match slot.as_ref() {
                Some(existing) if !force => existing.clone(),
                _ => {
                    let fresh = self.start(force);
                    *slot = Some(fresh.clone());
                    fresh
                }
            }
        };

        let result = future.clone().await;
        if result.is_err() {
            let mut slot = self.slot.lock();
            if slot.as_ref().is_some_and(|current| current.ptr_eq(&future)) {
                *slot = None;
            }
        }
        result
    }

    /// The loaded list, if a load already completed successfully.
    #[must_use]
    pub fn peek(&self) -> Option<EntityList> {
        self.slot
            .lock()
            .as_ref()
            .and_then(|f| f.peek().cloned())
            .and_then(Result::ok)
    }

    fn start(&self, force: bool) -> MetadataFuture {
        let host = Arc::clone(&self.host);
        let store = Arc::clone(&self.store);
        async move {
            let key = metadata_key(&host.origin());
            if !force {
                match read_json::<CachedMetadata>(store.as_ref(), &key) {
                    Ok(Some(cached)) => {
                        let mut entities = cached.entities;
                        sort_by_display_name(&mut entities);
                        tracing::debug!(
                            count = entities.len(),
                            fetched_at = %cached.fetched_at,
                            "entity metadata served from storage"
                        );
                        return Ok(Arc::new(entities));
                    }
                    Ok(None) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "ignoring unreadable entity metadata cache");
                    }
                }
            }

            let mut entities = host.entity_definitions().await?;
            sort_by_display_name(&mut entities);
            let cached = CachedMetadata {
                fetched_at: Utc::now(),
                entities,
            };
            if let Err(err) = write_json(store.as_ref(), &key, &cached) {
                tracing::warn!(error = %err, "could not persist entity metadata");
            }
            tracing::info!(count = cached.entities.len(), force, "entity metadata fetched");
            Ok(Arc::new(cached.entities))
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::host::MockHostApi;
    use crate::infrastructure::storage::MemoryStore;

    const ORIGIN: &str = "https://org.crm.dynamics.com";

    fn entity(logical: &str, display: &str) -> EntityInfo {
        EntityInfo {
            display_name: display.to_string(),
            ..EntityInfo::guessed(logical)
        }
    }

    fn mock_with_fetches(times: usize) -> MockHostApi {
        let mut mock = MockHostApi::new();
        mock.expect_origin().returning(|| ORIGIN.to_string());
        mock.expect_entity_definitions()
            .times(times)
            .returning(|| Ok(vec![entity("contact", "Contact"), entity("account", "Account")]));
        mock
    }

    #[tokio::test]
    async fn test_repeated_loads_fetch_once() {
        let store = Arc::new(MemoryStore::new());
        let cache = EntityMetadataCache::new(Arc::new(mock_with_fetches(1)), store.clone());

        let (a, b) = tokio::join!(cache.load(false), cache.load(false));
        let a = a.unwrap();
        assert!(Arc::ptr_eq(&a, &b.unwrap()));
        assert_eq!(a[0].logical_name, "account");

        let again = cache.load(false).await.unwrap();
        assert!(Arc::ptr_eq(&a, &again));
        assert!(store.get(&metadata_key(ORIGIN)).unwrap().is_some());
        assert!(cache.peek().is_some());
    }

    #[tokio::test]
    async fn test_force_fetches_again_and_overwrites() {
        let store = Arc::new(MemoryStore::new());
        let cache = EntityMetadataCache::new(Arc::new(mock_with_fetches(2)), store.clone());

        let first = cache.load(false).await.unwrap();
        let forced = cache.load(true).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &forced));
        // The forced result now backs non-forced calls.
        assert!(Arc::ptr_eq(&forced, &cache.load(false).await.unwrap()));
    }

    #[tokio::test]
    async fn test_persisted_metadata_skips_network() {
        let store = Arc::new(MemoryStore::new());
        let cached = CachedMetadata {
            fetched_at: Utc::now(),
            entities: vec![entity("b", "Beta"), entity("a", "Alpha")],
        };
        write_json(store.as_ref(), &metadata_key(ORIGIN), &cached).unwrap();

        let cache = EntityMetadataCache::new(Arc::new(mock_with_fetches(0)), store);
        let list = cache.load(false).await.unwrap();
        let names: Vec<&str> = list.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta"]);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let mut mock = MockHostApi::new();
        mock.expect_origin().returning(|| ORIGIN.to_string());
        let mut seq = mockall::Sequence::new();
        mock.expect_entity_definitions()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(HostError::Transport("connection reset".to_string())));
        mock.expect_entity_definitions()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![entity("account", "Account")]));

        let cache = EntityMetadataCache::new(Arc::new(mock), Arc::new(MemoryStore::new()));
        assert!(cache.load(false).await.is_err());
        assert!(cache.peek().is_none());
        assert_eq!(cache.load(false).await.unwrap().len(), 1);
    }
}
