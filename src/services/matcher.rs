//! Declarative search request matching for cache region templates.
//!
//! Three composable matchers:
//! - [`FilterMatch`]: a single `re:<pattern>` spec applied to the filter text
//! - [`AllFieldsMatch`]: one template, every configured field must match
//! - [`AnyTemplateMatch`]: a region's template list, any template may match

use regex::Regex;

use crate::domain::errors::ConfigError;
use crate::domain::models::{SearchRequest, TemplateConfig};

/// Something that decides whether a search request is eligible.
pub trait SearchMatch: Send + Sync {
    fn matches(&self, request: &SearchRequest) -> bool;
}

/// Template fields that can be matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateField {
    Filter,
}

impl TemplateField {
    pub const SUPPORTED: [Self; 1] = [Self::Filter];

    pub fn parse(name: &str) -> Option<Self> {
        Self::SUPPORTED
            .into_iter()
            .find(|field| field.as_str() == name)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filter => "filter",
        }
    }
}

/// Regular expression applied to the canonical filter text.
///
/// Matches when the pattern matches at the very start of the text; the rest
/// of the text may be left unmatched.
#[derive(Debug, Clone)]
pub struct FilterMatch {
    pattern: String,
    regex: Regex,
}

impl FilterMatch {
    /// Build from a `"<kind>:<pattern>"` spec. Only kind `re` is supported.
    pub fn from_spec(spec: &str) -> Result<Self, ConfigError> {
        let (kind, pattern) = spec
            .split_once(':')
            .ok_or_else(|| ConfigError::MalformedMatcher(spec.to_string()))?;

        if kind != "re" {
            return Err(ConfigError::InvalidMatcherKind {
                kind: kind.to_string(),
                spec: spec.to_string(),
            });
        }

        let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl SearchMatch for FilterMatch {
    fn matches(&self, request: &SearchRequest) -> bool {
        self.regex.is_match(&request.filter.as_text())
    }
}

/// One template: logical AND over its field matchers.
pub struct AllFieldsMatch {
    matchers: Vec<Box<dyn SearchMatch>>,
}

impl AllFieldsMatch {
    pub fn new(template: &TemplateConfig) -> Result<Self, ConfigError> {
        let mut matchers: Vec<Box<dyn SearchMatch>> = Vec::with_capacity(template.len());
        for (field_name, spec) in template {
            let field = TemplateField::parse(field_name)
                .ok_or_else(|| ConfigError::UnsupportedField(field_name.clone()))?;
            match field {
                TemplateField::Filter => matchers.push(Box::new(FilterMatch::from_spec(spec)?)),
            }
        }
        Ok(Self { matchers })
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl SearchMatch for AllFieldsMatch {
    fn matches(&self, request: &SearchRequest) -> bool {
        self.matchers.iter().all(|matcher| matcher.matches(request))
    }
}

/// A region's templates: logical OR, first match short-circuits.
pub struct AnyTemplateMatch {
    templates: Vec<AllFieldsMatch>,
}

impl AnyTemplateMatch {
    pub fn new(templates: &[TemplateConfig]) -> Result<Self, ConfigError> {
        if templates.is_empty() {
            return Err(ConfigError::EmptyTemplates);
        }

        let templates = templates
            .iter()
            .map(AllFieldsMatch::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { templates })
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }
}

impl SearchMatch for AnyTemplateMatch {
    fn matches(&self, request: &SearchRequest) -> bool {
        self.templates.iter().any(|template| template.matches(request))
    }
}
