//! Common test utilities for integration tests
//!
//! Fixtures for building a search cache from YAML and for driving a proxied
//! connection against the in-process scripted upstream.

use std::sync::Arc;

use ldapcached::adapters::mock::{RecordingClient, ScriptedUpstream};
use ldapcached::domain::models::{CacheConfig, Filter, PartialAttribute, SearchRequest, SearchResultEntry};
use ldapcached::services::{ConnectionEngine, SearchCache, Session};
use ldapcached::StoreRegistry;

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Build a search cache from a `cache_conf` YAML block.
#[allow(dead_code)]
pub fn cache_from_yaml(yaml: &str) -> Arc<SearchCache> {
    let config: CacheConfig = serde_yaml::from_str(yaml).expect("cache_conf should parse");
    let cache = SearchCache::from_config(&config, &StoreRegistry::with_defaults())
        .expect("cache should build");
    Arc::new(cache)
}

/// Cache with a single region accepting searches for exactly `(uid=alice)`.
#[allow(dead_code)]
pub fn alice_cache() -> Arc<SearchCache> {
    cache_from_yaml(
        r#"
regions:
  alice:
    templates:
      - filter: "re:^\\(uid=alice\\)"
    expiration_time: 300
"#,
    )
}

/// A new connection on `cache`, talking to `upstream`.
#[allow(dead_code)]
pub fn connect(
    cache: &Arc<SearchCache>,
    upstream: ScriptedUpstream,
) -> Session<ScriptedUpstream, RecordingClient> {
    Session::new(
        ConnectionEngine::new(Arc::clone(cache)),
        upstream,
        RecordingClient::new(),
    )
}

#[allow(dead_code)]
pub fn search(filter: &str) -> SearchRequest {
    SearchRequest::new(
        "dc=example,dc=com",
        Filter::parse(filter).expect("filter should parse"),
    )
}

#[allow(dead_code)]
pub fn entry(uid: &str, cn: &str) -> SearchResultEntry {
    SearchResultEntry::new(
        format!("uid={uid},ou=people,dc=example,dc=com"),
        vec![
            PartialAttribute::new("uid", [uid]),
            PartialAttribute::new("cn", [cn]),
        ],
    )
}
