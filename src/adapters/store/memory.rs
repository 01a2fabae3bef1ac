//! In-process store backed by a moka TTL cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::domain::errors::{ConfigError, StoreResult};
use crate::domain::models::{CacheKey, CachedSearch, StoreSettings};
use crate::domain::ports::{KeyValueStore, StoreFactory};

/// Backend identifier used in configuration.
pub const MEMORY_BACKEND: &str = "memory";

/// Concurrent in-memory store with optional TTL and bounded capacity.
///
/// When full, moka evicts entries by its own admission/eviction policy.
pub struct MemoryStore {
    entries: Cache<CacheKey, Arc<CachedSearch>>,
}

impl MemoryStore {
    /// Create a store holding at most `max_capacity` searches.
    pub fn new(max_capacity: u64, time_to_live: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(max_capacity);
        if let Some(ttl) = time_to_live {
            builder = builder.time_to_live(ttl);
        }
        Self {
            entries: builder.build(),
        }
    }

    pub fn from_settings(settings: &StoreSettings) -> Self {
        Self::new(settings.max_capacity, settings.time_to_live())
    }

    /// Approximate number of stored searches.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Flush moka's pending maintenance work (expiry, counters).
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn backend(&self) -> &'static str {
        MEMORY_BACKEND
    }

    async fn get(&self, key: &CacheKey) -> StoreResult<Option<Arc<CachedSearch>>> {
        Ok(self.entries.get(key).await)
    }

    async fn set(&self, key: CacheKey, value: Arc<CachedSearch>) -> StoreResult<()> {
        self.entries.insert(key, value).await;
        Ok(())
    }
}

/// Factory for [`MemoryStore`].
#[derive(Debug, Default)]
pub struct MemoryStoreFactory;

impl StoreFactory for MemoryStoreFactory {
    fn backend(&self) -> &'static str {
        MEMORY_BACKEND
    }

    fn create(
        &self,
        _region: &str,
        settings: &StoreSettings,
    ) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        Ok(Arc::new(MemoryStore::from_settings(settings)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Filter, LdapResult, SearchRequest};

    fn key(uid: &str) -> CacheKey {
        CacheKey::derive(
            &SearchRequest::new("dc=example,dc=com", Filter::equality("uid", uid)),
            None,
        )
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::new(100, None);
        let value = Arc::new(CachedSearch::new(vec![], LdapResult::success()));

        assert!(store.get(&key("alice")).await.unwrap().is_none());
        store.set(key("alice"), value.clone()).await.unwrap();
        assert_eq!(store.get(&key("alice")).await.unwrap(), Some(value));
        assert!(store.get(&key("bob")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryStore::new(100, None);
        let first = Arc::new(CachedSearch::new(vec![], LdapResult::success()));
        let second = Arc::new(CachedSearch::new(
            vec![],
            LdapResult::new(crate::domain::models::ResultCode::SUCCESS, "second"),
        ));

        store.set(key("alice"), first).await.unwrap();
        store.set(key("alice"), second.clone()).await.unwrap();
        store.run_pending_tasks().await;

        assert_eq!(store.get(&key("alice")).await.unwrap(), Some(second));
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = MemoryStore::new(100, Some(Duration::from_millis(50)));
        let value = Arc::new(CachedSearch::new(vec![], LdapResult::success()));
        store.set(key("alice"), value).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(store.get(&key("alice")).await.unwrap().is_none());
    }

    #[test]
    fn test_factory_backend() {
        let factory = MemoryStoreFactory;
        let store = factory
            .create("users", &StoreSettings::default())
            .expect("memory store should build");
        assert_eq!(store.backend(), MEMORY_BACKEND);
    }
}
