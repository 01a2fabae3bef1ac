//! Domain errors for the ldapcached proxy.

use thiserror::Error;

use super::models::message::ResultCode;

/// Configuration problems. All of them are detected while building the
/// search cache at startup, never at request time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Search filter match should be in form \"$type:$string\": \"{0}\"")]
    MalformedMatcher(String),

    #[error("Only \"re\" type filter match is currently supported: \"{kind}\" != \"re\" in \"{spec}\"")]
    InvalidMatcherKind { kind: String, spec: String },

    #[error("Invalid regular expression \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unsupported field type: \"{0}\"")]
    UnsupportedField(String),

    #[error("No templates configured for caching search requests")]
    EmptyTemplates,

    #[error("Unknown store backend: \"{0}\"")]
    UnknownBackend(String),

    #[error("Invalid store options: {0}")]
    InvalidStoreOptions(String),

    #[error("Invalid cache region \"{region}\": {source}")]
    Region {
        region: String,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("Upstream server address cannot be empty")]
    MissingUpstream,

    #[error("Invalid listen_port: {0}. Must be between 1 and 65535")]
    InvalidListenPort(u16),
}

impl ConfigError {
    /// Attach the name of the region whose configuration failed.
    pub fn in_region(self, region: &str) -> Self {
        Self::Region {
            region: region.to_string(),
            source: Box::new(self),
        }
    }
}

/// Failures of the transport collaborator (client or upstream connection).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Codec error: {0}")]
    Codec(String),
}

/// Failures of a keyed store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store backend \"{backend}\" failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    #[error("Store backend \"{0}\" is unavailable")]
    Unavailable(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that end a client connection. None of them is recoverable.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Bind request received while an anonymous bind is still pending")]
    BindAlreadyPending,

    #[error("Unexpected response to LDAP search request: {0}")]
    UnexpectedSearchResponse(&'static str),

    #[error("Unexpected response to deferred bind request: {0}")]
    UnexpectedBindResponse(&'static str),

    #[error("Upstream sent no response to deferred bind request")]
    MissingBindResponse,

    #[error("Deferred bind rejected by upstream: result code {code}: {message}")]
    BindRejected { code: ResultCode, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type ConnectionResult<T> = Result<T, ConnectionError>;
