//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Environment variable overrides
//! - Ordered cache region parsing with `serde_yaml`
//! - Configuration validation

pub mod loader;

pub use loader::{ConfigLoader, ENV_PREFIX};
