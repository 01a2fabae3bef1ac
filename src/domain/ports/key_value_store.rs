//! Keyed store port backing a cache region.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::{ConfigError, StoreResult};
use crate::domain::models::{CacheKey, CachedSearch, StoreSettings};

/// Keyed store holding cached search results for one region.
///
/// Implementations must tolerate concurrent `get`/`set` from many
/// connections. Last write wins; eviction and expiry are the backend's own
/// business.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Backend identifier, as used in configuration.
    fn backend(&self) -> &'static str;

    /// Fetch the value stored under `key`, `None` if absent or expired.
    async fn get(&self, key: &CacheKey) -> StoreResult<Option<Arc<CachedSearch>>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: CacheKey, value: Arc<CachedSearch>) -> StoreResult<()>;
}

/// Builds configured stores for one backend identifier.
pub trait StoreFactory: Send + Sync {
    /// Backend identifier this factory answers to.
    fn backend(&self) -> &'static str;

    /// Create a store for `region` from its merged settings.
    fn create(&self, region: &str, settings: &StoreSettings)
        -> Result<Arc<dyn KeyValueStore>, ConfigError>;
}
