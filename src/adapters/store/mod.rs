//! Keyed store backends for cache regions.
//!
//! - `memory`: moka TTL cache, bounded capacity
//! - `null`: stores nothing

pub mod memory;
pub mod null;
pub mod registry;

pub use memory::{MemoryStore, MemoryStoreFactory, MEMORY_BACKEND};
pub use null::{NullStore, NullStoreFactory, NULL_BACKEND};
pub use registry::StoreRegistry;
