//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces at the proxy's collaborator seams:
//! - KeyValueStore / StoreFactory: storage backing cache regions
//! - Upstream: the connection to the real directory server
//! - ClientSink: replies towards the client
//!
//! The decision engine depends only on these contracts, never on a concrete
//! codec or storage engine.

pub mod key_value_store;
pub mod transport;

pub use key_value_store::{KeyValueStore, StoreFactory};
pub use transport::{ClientSink, ResponseStream, Upstream};
