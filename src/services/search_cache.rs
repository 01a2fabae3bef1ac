//! Search result cache routed through ordered regions.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::adapters::store::StoreRegistry;
use crate::domain::errors::ConfigError;
use crate::domain::models::{
    CacheConfig, CacheKey, CachedSearch, Control, LdapResult, SearchRequest, SearchResultEntry,
};
use crate::services::cache_region::CacheRegion;
use crate::services::stats::ProxyStats;

/// Result of looking a search up in the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// A region holds a stored result for this search.
    Hit(Arc<CachedSearch>),
    /// A region accepts this search but has nothing stored.
    Miss,
    /// No region accepts this search.
    Disabled,
}

/// What `put_search` did with a finished search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored,
    /// Terminal status was not success.
    NegativeResult,
    /// The search returned no entries.
    EmptyResult,
    /// No region accepts this search.
    Disabled,
    /// The region's store reported an error.
    Failed,
}

/// Search cache shared read-only by every connection.
///
/// Regions are consulted in declaration order and the first region whose
/// templates accept a request owns it.
#[derive(Debug)]
pub struct SearchCache {
    regions: Vec<CacheRegion>,
    stats: Arc<ProxyStats>,
}

impl SearchCache {
    /// Build every configured region. Any configuration error aborts.
    pub fn from_config(config: &CacheConfig, registry: &StoreRegistry) -> Result<Self, ConfigError> {
        let regions = config
            .regions
            .iter()
            .map(|(name, region)| CacheRegion::new(name, &config.common, region, registry))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            regions = regions.len(),
            names = ?regions.iter().map(CacheRegion::name).collect::<Vec<_>>(),
            "search cache configured"
        );
        Ok(Self::new(regions))
    }

    pub fn new(regions: Vec<CacheRegion>) -> Self {
        Self {
            regions,
            stats: Arc::new(ProxyStats::new()),
        }
    }

    /// Cache without regions: every lookup is `Disabled`.
    pub fn disabled() -> Self {
        Self::new(Vec::new())
    }

    /// Share a statistics collector with other components.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<ProxyStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> &Arc<ProxyStats> {
        &self.stats
    }

    pub fn regions(&self) -> &[CacheRegion] {
        &self.regions
    }

    /// First region, in declaration order, whose templates accept `request`.
    pub fn find_region(&self, request: &SearchRequest) -> Option<&CacheRegion> {
        self.regions.iter().find(|region| region.matches(request))
    }

    /// Look a search up, distinguishing a miss from a disabled cache.
    pub async fn lookup(&self, request: &SearchRequest, controls: Option<&[Control]>) -> CacheLookup {
        debug!(filter = %request.filter, "search filter string");

        let Some(region) = self.find_region(request) else {
            self.stats.record_disabled();
            info!(outcome = "disabled", request = %request, controls = ?controls, "cache lookup");
            return CacheLookup::Disabled;
        };

        let key = CacheKey::derive(request, controls);
        match region.get(&key).await {
            Ok(Some(cached)) => {
                self.stats.record_hit();
                info!(
                    outcome = "hit",
                    region = region.name(),
                    request = %request,
                    controls = ?controls,
                    "cache lookup"
                );
                CacheLookup::Hit(cached)
            }
            Ok(None) => {
                self.stats.record_miss();
                info!(
                    outcome = "miss",
                    region = region.name(),
                    request = %request,
                    controls = ?controls,
                    "cache lookup"
                );
                CacheLookup::Miss
            }
            Err(e) => {
                self.stats.record_miss();
                warn!(region = region.name(), error = %e, "cache read failed, treating as miss");
                CacheLookup::Miss
            }
        }
    }

    /// Stored result for `request`, if any.
    pub async fn get_search(
        &self,
        request: &SearchRequest,
        controls: Option<&[Control]>,
    ) -> Option<Arc<CachedSearch>> {
        match self.lookup(request, controls).await {
            CacheLookup::Hit(cached) => Some(cached),
            CacheLookup::Miss | CacheLookup::Disabled => None,
        }
    }

    /// Store a finished search.
    ///
    /// Negative results and empty result sets are never stored. A stored
    /// value replaces whatever was kept under the same key before.
    pub async fn put_search(
        &self,
        request: &SearchRequest,
        controls: Option<&[Control]>,
        entries: Vec<SearchResultEntry>,
        done: &LdapResult,
    ) -> StoreOutcome {
        let outcome = self.store(request, controls, entries, done).await;
        if outcome == StoreOutcome::Stored {
            self.stats.record_stored();
        } else {
            self.stats.record_skipped();
        }
        outcome
    }

    async fn store(
        &self,
        request: &SearchRequest,
        controls: Option<&[Control]>,
        entries: Vec<SearchResultEntry>,
        done: &LdapResult,
    ) -> StoreOutcome {
        if !done.is_success() {
            return StoreOutcome::NegativeResult;
        }
        if entries.is_empty() {
            return StoreOutcome::EmptyResult;
        }
        let Some(region) = self.find_region(request) else {
            return StoreOutcome::Disabled;
        };

        let key = CacheKey::derive(request, controls);
        let entry_count = entries.len();
        match region.set(key, CachedSearch::new(entries, done.clone())).await {
            Ok(()) => {
                debug!(region = region.name(), entries = entry_count, "search result stored");
                StoreOutcome::Stored
            }
            Err(e) => {
                warn!(region = region.name(), error = %e, "cache write failed, result not stored");
                StoreOutcome::Failed
            }
        }
    }
}
