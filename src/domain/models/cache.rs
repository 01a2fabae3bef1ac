//! Cache key and cached search value.

use std::fmt;

use super::message::{controls_text, Control, LdapResult, SearchRequest, SearchResultEntry};

/// Key under which a search result is cached.
///
/// Built from the canonical text of the request and of its controls, so two
/// structurally equal requests with equal controls always produce equal keys.
/// Absent controls and an empty control list produce different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    request: String,
    controls: Option<String>,
}

impl CacheKey {
    pub fn derive(request: &SearchRequest, controls: Option<&[Control]>) -> Self {
        Self {
            request: request.to_string(),
            controls: controls.map(controls_text),
        }
    }

    pub fn request_text(&self) -> &str {
        &self.request
    }

    pub fn controls_text(&self) -> Option<&str> {
        self.controls.as_deref()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.controls {
            Some(controls) => write!(f, "{} {}", self.request, controls),
            None => write!(f, "{} None", self.request),
        }
    }
}

/// Stored outcome of one search: the streamed entries plus the terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSearch {
    pub entries: Vec<SearchResultEntry>,
    pub done: LdapResult,
}

impl CachedSearch {
    pub const fn new(entries: Vec<SearchResultEntry>, done: LdapResult) -> Self {
        Self { entries, done }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::filter::Filter;

    fn search(uid: &str) -> SearchRequest {
        SearchRequest::new("dc=example,dc=com", Filter::equality("uid", uid))
    }

    #[test]
    fn test_equal_requests_derive_equal_keys() {
        let controls = vec![Control::new("1.2.3", false, None)];
        assert_eq!(
            CacheKey::derive(&search("alice"), Some(controls.as_slice())),
            CacheKey::derive(&search("alice"), Some(controls.clone().as_slice())),
        );
        assert_eq!(
            CacheKey::derive(&search("alice"), None),
            CacheKey::derive(&search("alice"), None),
        );
    }

    #[test]
    fn test_different_requests_derive_different_keys() {
        assert_ne!(
            CacheKey::derive(&search("alice"), None),
            CacheKey::derive(&search("bob"), None),
        );
    }

    #[test]
    fn test_absent_controls_differ_from_empty_controls() {
        assert_ne!(
            CacheKey::derive(&search("alice"), None),
            CacheKey::derive(&search("alice"), Some(&[][..])),
        );
    }
}
