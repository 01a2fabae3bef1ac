//! Domain layer for the ldapcached proxy
//!
//! Protocol object model, cache key derivation, configuration model, error
//! types and the ports the proxy core is written against.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ConfigError, ConnectionError, StoreError, TransportError};
