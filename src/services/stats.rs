//! Proxy-wide counters shared by every connection.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free counters for cache and bind-coalescing outcomes.
#[derive(Debug, Default)]
pub struct ProxyStats {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_disabled: AtomicU64,
    results_stored: AtomicU64,
    results_skipped: AtomicU64,
    binds_avoided: AtomicU64,
    binds_flushed: AtomicU64,
    unbinds_forwarded: AtomicU64,
}

/// Point-in-time copy of [`ProxyStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_disabled: u64,
    pub results_stored: u64,
    pub results_skipped: u64,
    pub binds_avoided: u64,
    pub binds_flushed: u64,
    pub unbinds_forwarded: u64,
}

impl ProxyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disabled(&self) {
        self.cache_disabled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stored(&self) {
        self.results_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.results_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bind_avoided(&self) {
        self.binds_avoided.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bind_flushed(&self) {
        self.binds_flushed.fetch_add(1, Ordering::Relaxed);
    }

    /// Unbind forwarded because no deferred bind could absorb it.
    pub fn record_unbind_forwarded(&self) {
        self.unbinds_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_disabled: self.cache_disabled.load(Ordering::Relaxed),
            results_stored: self.results_stored.load(Ordering::Relaxed),
            results_skipped: self.results_skipped.load(Ordering::Relaxed),
            binds_avoided: self.binds_avoided.load(Ordering::Relaxed),
            binds_flushed: self.binds_flushed.load(Ordering::Relaxed),
            unbinds_forwarded: self.unbinds_forwarded.load(Ordering::Relaxed),
        }
    }
}
