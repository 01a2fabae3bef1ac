//! Registry mapping backend identifiers to store factories.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::errors::ConfigError;
use crate::domain::models::StoreSettings;
use crate::domain::ports::{KeyValueStore, StoreFactory};

use super::memory::MemoryStoreFactory;
use super::null::NullStoreFactory;

/// Registry of store factories keyed by backend identifier.
pub struct StoreRegistry {
    factories: HashMap<&'static str, Box<dyn StoreFactory>>,
}

impl StoreRegistry {
    /// Registry without any backend.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in `memory` and `null` backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(MemoryStoreFactory));
        registry.register(Box::new(NullStoreFactory));
        registry
    }

    /// Add (or replace) a factory.
    pub fn register(&mut self, factory: Box<dyn StoreFactory>) {
        self.factories.insert(factory.backend(), factory);
    }

    /// Registered backend identifiers, sorted.
    pub fn backends(&self) -> Vec<&'static str> {
        let mut backends: Vec<_> = self.factories.keys().copied().collect();
        backends.sort_unstable();
        backends
    }

    /// Create the store described by `settings` for `region`.
    pub fn create(
        &self,
        region: &str,
        settings: &StoreSettings,
    ) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        let factory = self
            .factories
            .get(settings.backend.as_str())
            .ok_or_else(|| ConfigError::UnknownBackend(settings.backend.clone()))?;
        factory.create(region, settings)
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backends() {
        assert_eq!(StoreRegistry::with_defaults().backends(), vec!["memory", "null"]);
        assert!(StoreRegistry::empty().backends().is_empty());
    }

    #[test]
    fn test_unknown_backend() {
        let settings = StoreSettings {
            backend: "dogpile.cache.redis".to_string(),
            ..StoreSettings::default()
        };
        let result = StoreRegistry::with_defaults().create("users", &settings);
        assert!(matches!(result, Err(ConfigError::UnknownBackend(b)) if b == "dogpile.cache.redis"));
    }

    #[test]
    fn test_creates_requested_backend() {
        let settings = StoreSettings {
            backend: "null".to_string(),
            ..StoreSettings::default()
        };
        let store = StoreRegistry::with_defaults().create("users", &settings).unwrap();
        assert_eq!(store.backend(), "null");
    }
}
