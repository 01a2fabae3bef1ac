pub mod cache_region;
pub mod connection_engine;
pub mod matcher;
pub mod search_cache;
pub mod session;
pub mod stats;

pub use cache_region::CacheRegion;
pub use connection_engine::{ConnectionEngine, ConnectionState, Decision};
pub use matcher::{AllFieldsMatch, AnyTemplateMatch, FilterMatch, SearchMatch, TemplateField};
pub use search_cache::{CacheLookup, SearchCache, StoreOutcome};
pub use session::{InboundRequest, Session};
pub use stats::{ProxyStats, StatsSnapshot};
