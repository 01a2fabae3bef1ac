//! A named cache region: which searches it accepts and where it keeps them.

use std::fmt;
use std::sync::Arc;

use crate::adapters::store::StoreRegistry;
use crate::domain::errors::{ConfigError, StoreResult};
use crate::domain::models::{
    CacheKey, CachedSearch, RegionConfig, SearchRequest, StoreOptions, StoreSettings,
};
use crate::domain::ports::KeyValueStore;
use crate::services::matcher::{AnyTemplateMatch, SearchMatch};

/// Cache region built once from configuration and immutable afterwards.
pub struct CacheRegion {
    name: String,
    matcher: AnyTemplateMatch,
    settings: StoreSettings,
    store: Arc<dyn KeyValueStore>,
}

impl CacheRegion {
    /// Build a region from its configuration.
    ///
    /// Store options are `common` overridden by the region's own keys. The
    /// region keeps its own copies; the configuration values can be dropped
    /// or changed afterwards without affecting it.
    pub fn new(
        name: &str,
        common: &StoreOptions,
        config: &RegionConfig,
        registry: &StoreRegistry,
    ) -> Result<Self, ConfigError> {
        let build = || -> Result<Self, ConfigError> {
            let matcher = AnyTemplateMatch::new(&config.templates)?;
            let settings = StoreSettings::merged(common, &config.store)?;
            let store = registry.create(name, &settings)?;
            Ok(Self {
                name: name.to_string(),
                matcher,
                settings,
                store,
            })
        };
        build().map_err(|e| e.in_region(name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn template_count(&self) -> usize {
        self.matcher.template_count()
    }

    pub fn matches(&self, request: &SearchRequest) -> bool {
        self.matcher.matches(request)
    }

    pub async fn get(&self, key: &CacheKey) -> StoreResult<Option<Arc<CachedSearch>>> {
        self.store.get(key).await
    }

    pub async fn set(&self, key: CacheKey, value: CachedSearch) -> StoreResult<()> {
        self.store.set(key, Arc::new(value)).await
    }
}

impl fmt::Debug for CacheRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegion")
            .field("name", &self.name)
            .field("templates", &self.matcher.template_count())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Filter, LdapResult, TemplateConfig};
    use serde_json::json;

    fn region_config(filter_spec: &str) -> RegionConfig {
        RegionConfig {
            templates: vec![TemplateConfig::from([(
                "filter".to_string(),
                filter_spec.to_string(),
            )])],
            store: StoreOptions::new(),
        }
    }

    #[test]
    fn test_region_merges_common_options() {
        let common = json!({"backend": "memory", "expiration_time": 300})
            .as_object()
            .cloned()
            .unwrap();
        let mut config = region_config(r"re:\(uid=");
        config.store.insert("expiration_time".to_string(), json!(30));

        let region =
            CacheRegion::new("users", &common, &config, &StoreRegistry::with_defaults()).unwrap();
        assert_eq!(region.name(), "users");
        assert_eq!(region.settings().expiration_time, Some(30));
        assert_eq!(region.template_count(), 1);

        // Changing the source configuration later has no effect on the region.
        config.store.insert("expiration_time".to_string(), json!(5));
        assert_eq!(region.settings().expiration_time, Some(30));
    }

    #[test]
    fn test_region_errors_name_the_region() {
        let config = RegionConfig::default();
        let err = CacheRegion::new(
            "groups",
            &StoreOptions::new(),
            &config,
            &StoreRegistry::with_defaults(),
        )
        .unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::Region { region, source }
                if region == "groups" && matches!(**source, ConfigError::EmptyTemplates)
        ));
        assert!(err.to_string().contains("groups"));
    }

    #[tokio::test]
    async fn test_region_get_set() {
        let region = CacheRegion::new(
            "users",
            &StoreOptions::new(),
            &region_config(r"re:\(uid="),
            &StoreRegistry::with_defaults(),
        )
        .unwrap();

        let request = SearchRequest::new("dc=example,dc=com", Filter::equality("uid", "alice"));
        assert!(region.matches(&request));

        let key = CacheKey::derive(&request, None);
        assert!(region.get(&key).await.unwrap().is_none());

        let value = CachedSearch::new(vec![], LdapResult::success());
        region.set(key.clone(), value.clone()).await.unwrap();
        assert_eq!(region.get(&key).await.unwrap().as_deref(), Some(&value));
    }
}
