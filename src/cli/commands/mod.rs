//! CLI command implementations.

pub mod check;
pub mod route;

use anyhow::{Context, Result};

use crate::adapters::store::StoreRegistry;
use crate::domain::models::Config;
use crate::services::SearchCache;

/// Build the search cache exactly as the proxy does at startup.
pub fn build_search_cache(config: &Config) -> Result<SearchCache> {
    SearchCache::from_config(&config.cache_conf, &StoreRegistry::with_defaults())
        .context("Invalid cache configuration")
}
