//! Protocol object model inspected by the proxy.
//!
//! Only bind, unbind and search are modelled in detail. Every other operation
//! travels through the proxy as an [`OpaqueMessage`] produced by the codec.

use std::fmt;

use super::filter::Filter;

/// LDAP result code (RFC 4511 section 4.1.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultCode(pub u32);

impl ResultCode {
    pub const SUCCESS: Self = Self(0);
    pub const OPERATIONS_ERROR: Self = Self(1);
    pub const PROTOCOL_ERROR: Self = Self(2);
    pub const SIZE_LIMIT_EXCEEDED: Self = Self(4);
    pub const NO_SUCH_OBJECT: Self = Self(32);
    pub const INVALID_CREDENTIALS: Self = Self(49);
    pub const BUSY: Self = Self(51);
    pub const UNAVAILABLE: Self = Self(52);

    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request control attached to an LDAP message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Control {
    pub oid: String,
    pub criticality: bool,
    pub value: Option<Vec<u8>>,
}

impl Control {
    pub fn new(oid: impl Into<String>, criticality: bool, value: Option<Vec<u8>>) -> Self {
        Self {
            oid: oid.into(),
            criticality,
            value,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Control(oid='{}', criticality={}", self.oid, self.criticality)?;
        match &self.value {
            Some(value) => write!(f, ", value={})", hex(value)),
            None => write!(f, ", value=None)"),
        }
    }
}

/// Controls accompanying a request. `None` at call sites means the message
/// carried no controls element at all, which is distinct from an empty list.
pub type Controls = Vec<Control>;

/// Render a control list in its canonical form.
pub fn controls_text(controls: &[Control]) -> String {
    let rendered: Vec<String> = controls.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}

/// Authentication choice of a bind request.
#[derive(Clone, PartialEq, Eq)]
pub enum BindAuthentication {
    Simple(String),
    Sasl {
        mechanism: String,
        credentials: Option<Vec<u8>>,
    },
}

/// Bind request.
///
/// `Debug` and `Display` never print the credential.
#[derive(Clone, PartialEq, Eq)]
pub struct BindRequest {
    pub version: u8,
    pub dn: String,
    pub authentication: BindAuthentication,
}

impl BindRequest {
    /// Simple bind with a DN and password.
    pub fn simple(dn: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            version: 3,
            dn: dn.into(),
            authentication: BindAuthentication::Simple(password.into()),
        }
    }

    /// Anonymous simple bind: empty DN, empty password.
    pub fn anonymous() -> Self {
        Self::simple("", "")
    }

    /// True for a simple bind with neither a principal nor a credential.
    /// SASL binds are never treated as anonymous.
    pub fn is_anonymous(&self) -> bool {
        match &self.authentication {
            BindAuthentication::Simple(password) => self.dn.is_empty() && password.is_empty(),
            BindAuthentication::Sasl { .. } => false,
        }
    }

    fn sasl_mechanism(&self) -> Option<&str> {
        match &self.authentication {
            BindAuthentication::Simple(_) => None,
            BindAuthentication::Sasl { mechanism, .. } => Some(mechanism),
        }
    }
}

impl fmt::Display for BindRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BindRequest(version={}, dn='{}', auth=****, sasl={})",
            self.version,
            self.dn,
            self.sasl_mechanism()
                .map_or_else(|| "None".to_string(), |mechanism| format!("'{mechanism}'")),
        )
    }
}

impl fmt::Debug for BindRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Search scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchScope {
    BaseObject,
    SingleLevel,
    #[default]
    WholeSubtree,
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BaseObject => write!(f, "base"),
            Self::SingleLevel => write!(f, "one"),
            Self::WholeSubtree => write!(f, "sub"),
        }
    }
}

/// Alias dereferencing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DerefAliases {
    #[default]
    Never,
    InSearching,
    FindingBaseObject,
    Always,
}

impl fmt::Display for DerefAliases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::InSearching => write!(f, "searching"),
            Self::FindingBaseObject => write!(f, "finding"),
            Self::Always => write!(f, "always"),
        }
    }
}

/// Search request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchRequest {
    pub base_object: String,
    pub scope: SearchScope,
    pub deref_aliases: DerefAliases,
    pub size_limit: u32,
    pub time_limit: u32,
    pub types_only: bool,
    pub filter: Filter,
    pub attributes: Vec<String>,
}

impl SearchRequest {
    /// Subtree search under `base_object` returning all user attributes.
    pub fn new(base_object: impl Into<String>, filter: Filter) -> Self {
        Self {
            base_object: base_object.into(),
            scope: SearchScope::WholeSubtree,
            deref_aliases: DerefAliases::Never,
            size_limit: 0,
            time_limit: 0,
            types_only: false,
            filter,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }
}

/// Quote `text` so that distinct strings never render the same.
fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if matches!(ch, '\'' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SearchRequest(base={}, scope={}, deref={}, size_limit={}, time_limit={}, \
             types_only={}, filter={}, attributes=[{}])",
            quoted(&self.base_object),
            self.scope,
            self.deref_aliases,
            self.size_limit,
            self.time_limit,
            self.types_only,
            self.filter.as_text(),
            self.attributes
                .iter()
                .map(|attr| quoted(attr))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Attribute with its values in a search result entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialAttribute {
    pub name: String,
    pub values: Vec<Vec<u8>>,
}

impl PartialAttribute {
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// One entry streamed back for a search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchResultEntry {
    pub object_name: String,
    pub attributes: Vec<PartialAttribute>,
}

impl SearchResultEntry {
    pub fn new(object_name: impl Into<String>, attributes: Vec<PartialAttribute>) -> Self {
        Self {
            object_name: object_name.into(),
            attributes,
        }
    }
}

/// Status carried by bind responses and the terminal search message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LdapResult {
    pub code: ResultCode,
    pub matched_dn: String,
    pub diagnostic_message: String,
    pub referral: Vec<String>,
}

impl LdapResult {
    pub fn new(code: ResultCode, diagnostic_message: impl Into<String>) -> Self {
        Self {
            code,
            matched_dn: String::new(),
            diagnostic_message: diagnostic_message.into(),
            referral: Vec::new(),
        }
    }

    pub fn success() -> Self {
        Self::new(ResultCode::SUCCESS, "")
    }

    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

/// Bind response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindResponse {
    pub result: LdapResult,
    pub server_sasl_credentials: Option<Vec<u8>>,
}

impl BindResponse {
    pub fn success() -> Self {
        Self {
            result: LdapResult::success(),
            server_sasl_credentials: None,
        }
    }

    pub fn failure(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            result: LdapResult::new(code, message),
            server_sasl_credentials: None,
        }
    }
}

/// A protocol operation the proxy passes through without inspecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueMessage {
    /// Application tag of the protocol operation.
    pub tag: u8,
    /// Encoded operation body, as handed over by the codec.
    pub payload: Vec<u8>,
}

/// Client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Bind(BindRequest),
    Unbind,
    Search(SearchRequest),
    Other(OpaqueMessage),
}

impl Request {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bind(_) => "bind",
            Self::Unbind => "unbind",
            Self::Search(_) => "search",
            Self::Other(_) => "other",
        }
    }
}

/// Server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Bind(BindResponse),
    SearchEntry(SearchResultEntry),
    SearchDone(LdapResult),
    Other(OpaqueMessage),
}

impl Response {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bind(_) => "bind_response",
            Self::SearchEntry(_) => "search_result_entry",
            Self::SearchDone(_) => "search_result_done",
            Self::Other(_) => "other",
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_display_quotes_unambiguously() {
        let joined = SearchRequest::new("", Filter::present("cn")).with_attributes(["a', 'b"]);
        let split = SearchRequest::new("", Filter::present("cn")).with_attributes(["a", "b"]);
        assert_ne!(joined.to_string(), split.to_string());
        assert!(split.to_string().ends_with("attributes=['a', 'b'])"));

        let base = SearchRequest::new("o=it's\\", Filter::present("cn"));
        assert!(base.to_string().starts_with("SearchRequest(base='o=it\\'s\\\\',"));
    }

    #[test]
    fn test_anonymous_bind_detection() {
        assert!(BindRequest::anonymous().is_anonymous());
        assert!(!BindRequest::simple("cn=admin,dc=example,dc=com", "").is_anonymous());
        assert!(!BindRequest::simple("", "secret").is_anonymous());

        let sasl = BindRequest {
            version: 3,
            dn: String::new(),
            authentication: BindAuthentication::Sasl {
                mechanism: "EXTERNAL".to_string(),
                credentials: None,
            },
        };
        assert!(!sasl.is_anonymous());
    }

    #[test]
    fn test_bind_request_formatting_hides_credentials() {
        let bind = BindRequest::simple("cn=admin", "hunter2");
        let rendered = format!("{bind:?}");
        assert_eq!(
            rendered,
            "BindRequest(version=3, dn='cn=admin', auth=****, sasl=None)"
        );
        assert!(!bind.to_string().contains("hunter2"));
    }

    #[test]
    fn test_search_request_rendering_is_stable() {
        let request = SearchRequest::new("dc=example,dc=com", Filter::equality("uid", "alice"))
            .with_attributes(["cn", "mail"]);
        assert_eq!(
            request.to_string(),
            "SearchRequest(base='dc=example,dc=com', scope=sub, deref=never, size_limit=0, \
             time_limit=0, types_only=false, filter=(uid=alice), attributes=['cn', 'mail'])"
        );
    }

    #[test]
    fn test_controls_text() {
        let controls = vec![
            Control::new("1.2.840.113556.1.4.319", true, Some(vec![0x30, 0x05])),
            Control::new("2.16.840.1.113730.3.4.2", false, None),
        ];
        assert_eq!(
            controls_text(&controls),
            "[Control(oid='1.2.840.113556.1.4.319', criticality=true, value=3005), \
             Control(oid='2.16.840.1.113730.3.4.2', criticality=false, value=None)]"
        );
        assert_eq!(controls_text(&[]), "[]");
    }

    #[test]
    fn test_result_code_success() {
        assert!(ResultCode::SUCCESS.is_success());
        assert!(!ResultCode::NO_SUCH_OBJECT.is_success());
        assert!(LdapResult::success().is_success());
    }
}
