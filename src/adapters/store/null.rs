//! Store that never keeps anything. Useful to switch a region off without
//! removing its templates.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::{ConfigError, StoreResult};
use crate::domain::models::{CacheKey, CachedSearch, StoreSettings};
use crate::domain::ports::{KeyValueStore, StoreFactory};

pub const NULL_BACKEND: &str = "null";

#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

#[async_trait]
impl KeyValueStore for NullStore {
    fn backend(&self) -> &'static str {
        NULL_BACKEND
    }

    async fn get(&self, _key: &CacheKey) -> StoreResult<Option<Arc<CachedSearch>>> {
        Ok(None)
    }

    async fn set(&self, _key: CacheKey, _value: Arc<CachedSearch>) -> StoreResult<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NullStoreFactory;

impl StoreFactory for NullStoreFactory {
    fn backend(&self) -> &'static str {
        NULL_BACKEND
    }

    fn create(
        &self,
        _region: &str,
        _settings: &StoreSettings,
    ) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        Ok(Arc::new(NullStore))
    }
}
