//! Adapters implementing the domain ports.

pub mod mock;
pub mod store;
