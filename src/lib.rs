//! ldapcached - caching LDAP proxy core
//!
//! Sits between LDAP clients and one upstream directory server. Repeated
//! searches are answered from a region-partitioned cache, and an anonymous
//! bind that is immediately followed by an unbind never reaches the upstream.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): protocol object model, cache keys, configuration model, ports
//! - **Service Layer** (`services`): matcher, cache regions, search cache, per-connection engine
//! - **Adapters** (`adapters`): store backends and in-process transport doubles
//! - **Infrastructure Layer** (`infrastructure`): configuration loading and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! The wire codec and socket handling live outside this crate and reach it
//! through the [`Upstream`](domain::ports::Upstream) and
//! [`ClientSink`](domain::ports::ClientSink) ports.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::store::StoreRegistry;
pub use domain::errors::{ConfigError, ConnectionError, StoreError, TransportError};
pub use domain::models::{CacheConfig, CacheKey, CachedSearch, Config, Filter, Request, Response};
pub use domain::ports::{ClientSink, KeyValueStore, StoreFactory, Upstream};
pub use infrastructure::config::ConfigLoader;
pub use services::{ConnectionEngine, Decision, ProxyStats, SearchCache, Session};
