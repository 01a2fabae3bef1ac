pub mod cache;
pub mod config;
pub mod filter;
pub mod message;
pub mod store;

pub use cache::{CacheKey, CachedSearch};
pub use config::{CacheConfig, Config, RegionConfig, RegionsConfig, StoreOptions, TemplateConfig};
pub use filter::{AttributeValueAssertion, ExtensibleMatch, Filter, FilterParseError, SubstringFilter};
pub use message::{
    BindAuthentication, BindRequest, BindResponse, Control, Controls, DerefAliases, LdapResult,
    OpaqueMessage, PartialAttribute, Request, Response, ResultCode, SearchRequest,
    SearchResultEntry, SearchScope,
};
pub use store::StoreSettings;
