//! Search filter tree with canonical RFC 4515 text rendering.
//!
//! Cache region templates match against the text produced by
//! [`Filter::as_text`], so the rendering must be stable: the same tree always
//! renders to the same string.

use std::fmt;

use thiserror::Error;

/// Attribute/value pair used by equality, ordering and approximate filters.
///
/// Assertion values are octet strings and may hold binary data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeValueAssertion {
    pub attribute: String,
    pub value: Vec<u8>,
}

impl AttributeValueAssertion {
    pub fn new(attribute: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// `(attr=initial*any*...*final)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubstringFilter {
    pub attribute: String,
    pub initial: Option<Vec<u8>>,
    pub any: Vec<Vec<u8>>,
    pub final_value: Option<Vec<u8>>,
}

/// `(attr:dn:rule:=value)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensibleMatch {
    pub matching_rule: Option<String>,
    pub attribute: Option<String>,
    pub value: Vec<u8>,
    pub dn_attributes: bool,
}

/// LDAP search filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Equality(AttributeValueAssertion),
    Substrings(SubstringFilter),
    GreaterOrEqual(AttributeValueAssertion),
    LessOrEqual(AttributeValueAssertion),
    Present(String),
    Approx(AttributeValueAssertion),
    Extensible(ExtensibleMatch),
}

impl Filter {
    /// Shorthand for an equality filter.
    pub fn equality(attribute: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::Equality(AttributeValueAssertion::new(attribute, value))
    }

    /// Shorthand for a presence filter.
    pub fn present(attribute: impl Into<String>) -> Self {
        Self::Present(attribute.into())
    }

    /// Render the canonical textual form, e.g. `(&(objectClass=person)(uid=alice))`.
    pub fn as_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    /// Parse a filter string. A single item without surrounding parentheses
    /// (`uid=alice`) is accepted as well.
    pub fn parse(input: &str) -> Result<Self, FilterParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FilterParseError::new(0, "empty filter"));
        }

        let text = if trimmed.starts_with('(') {
            trimmed.to_string()
        } else {
            format!("({trimmed})")
        };

        let mut parser = Parser {
            input: &text,
            pos: 0,
        };
        let filter = parser.filter()?;
        if parser.pos != text.len() {
            return Err(FilterParseError::new(
                parser.pos,
                "unexpected trailing characters",
            ));
        }
        Ok(filter)
    }

    fn write_text(&self, out: &mut String) {
        match self {
            Self::And(children) => {
                out.push_str("(&");
                children.iter().for_each(|child| child.write_text(out));
                out.push(')');
            }
            Self::Or(children) => {
                out.push_str("(|");
                children.iter().for_each(|child| child.write_text(out));
                out.push(')');
            }
            Self::Not(child) => {
                out.push_str("(!");
                child.write_text(out);
                out.push(')');
            }
            Self::Equality(ava) => write_assertion(out, ava, "="),
            Self::GreaterOrEqual(ava) => write_assertion(out, ava, ">="),
            Self::LessOrEqual(ava) => write_assertion(out, ava, "<="),
            Self::Approx(ava) => write_assertion(out, ava, "~="),
            Self::Present(attribute) => {
                out.push('(');
                out.push_str(attribute);
                out.push_str("=*)");
            }
            Self::Substrings(sub) => {
                out.push('(');
                out.push_str(&sub.attribute);
                out.push('=');
                if let Some(initial) = &sub.initial {
                    escape_value_into(out, initial);
                }
                out.push('*');
                for any in &sub.any {
                    escape_value_into(out, any);
                    out.push('*');
                }
                if let Some(final_value) = &sub.final_value {
                    escape_value_into(out, final_value);
                }
                out.push(')');
            }
            Self::Extensible(ext) => {
                out.push('(');
                if let Some(attribute) = &ext.attribute {
                    out.push_str(attribute);
                }
                if ext.dn_attributes {
                    out.push_str(":dn");
                }
                if let Some(rule) = &ext.matching_rule {
                    out.push(':');
                    out.push_str(rule);
                }
                out.push_str(":=");
                escape_value_into(out, &ext.value);
                out.push(')');
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

fn write_assertion(out: &mut String, ava: &AttributeValueAssertion, op: &str) {
    out.push('(');
    out.push_str(&ava.attribute);
    out.push_str(op);
    escape_value_into(out, &ava.value);
    out.push(')');
}

/// Escape an assertion value per RFC 4515 section 3. Bytes that are not
/// part of valid UTF-8 are written as `\XX`.
fn escape_value_into(out: &mut String, value: &[u8]) {
    for chunk in value.utf8_chunks() {
        for ch in chunk.valid().chars() {
            match ch {
                '*' | '(' | ')' | '\\' | '\0' => push_hex_escape(out, ch as u8),
                c if c.is_ascii_control() => push_hex_escape(out, c as u8),
                c => out.push(c),
            }
        }
        for &byte in chunk.invalid() {
            push_hex_escape(out, byte);
        }
    }
}

fn push_hex_escape(out: &mut String, byte: u8) {
    out.push_str(&format!("\\{byte:02x}"));
}

/// Error returned by [`Filter::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid search filter at offset {position}: {message}")]
pub struct FilterParseError {
    pub position: usize,
    pub message: String,
}

impl FilterParseError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<(), FilterParseError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(FilterParseError::new(
                self.pos,
                format!("expected '{}', found '{}'", byte as char, b as char),
            )),
            None => Err(FilterParseError::new(
                self.pos,
                format!("expected '{}', found end of input", byte as char),
            )),
        }
    }

    fn filter(&mut self) -> Result<Filter, FilterParseError> {
        self.expect(b'(')?;
        let filter = match self.peek() {
            Some(b'&') => {
                self.pos += 1;
                Filter::And(self.filter_list()?)
            }
            Some(b'|') => {
                self.pos += 1;
                Filter::Or(self.filter_list()?)
            }
            Some(b'!') => {
                self.pos += 1;
                Filter::Not(Box::new(self.filter()?))
            }
            Some(_) => self.item()?,
            None => return Err(FilterParseError::new(self.pos, "unterminated filter")),
        };
        self.expect(b')')?;
        Ok(filter)
    }

    fn filter_list(&mut self) -> Result<Vec<Filter>, FilterParseError> {
        let mut children = Vec::new();
        while self.peek() == Some(b'(') {
            children.push(self.filter()?);
        }
        Ok(children)
    }

    fn item(&mut self) -> Result<Filter, FilterParseError> {
        let start = self.pos;
        let rest = &self.input[start..];
        let len = rest
            .find(|c: char| c == '(' || c == ')')
            .ok_or_else(|| FilterParseError::new(self.input.len(), "unterminated filter"))?;
        if rest.as_bytes()[len] == b'(' {
            return Err(FilterParseError::new(start + len, "unescaped '(' in value"));
        }
        self.pos = start + len;
        parse_item(&rest[..len], start)
    }
}

fn parse_item(text: &str, offset: usize) -> Result<Filter, FilterParseError> {
    let eq = text
        .find('=')
        .ok_or_else(|| FilterParseError::new(offset, "missing '=' in filter item"))?;
    let value = &text[eq + 1..];
    let (lhs, op) = match text[..eq].as_bytes().last() {
        Some(b':') => (&text[..eq - 1], ":="),
        Some(b'~') => (&text[..eq - 1], "~="),
        Some(b'>') => (&text[..eq - 1], ">="),
        Some(b'<') => (&text[..eq - 1], "<="),
        _ => (&text[..eq], "="),
    };

    if op == ":=" {
        return parse_extensible(lhs, value, offset);
    }

    let attribute = parse_attribute(lhs, offset)?;
    let filter = match op {
        "~=" => Filter::Approx(AttributeValueAssertion::new(attribute, unescape(value, offset)?)),
        ">=" => Filter::GreaterOrEqual(AttributeValueAssertion::new(
            attribute,
            unescape(value, offset)?,
        )),
        "<=" => Filter::LessOrEqual(AttributeValueAssertion::new(
            attribute,
            unescape(value, offset)?,
        )),
        _ if value == "*" => Filter::Present(attribute),
        _ if value.contains('*') => parse_substrings(attribute, value, offset)?,
        _ => Filter::Equality(AttributeValueAssertion::new(attribute, unescape(value, offset)?)),
    };
    Ok(filter)
}

fn parse_attribute(text: &str, offset: usize) -> Result<String, FilterParseError> {
    if text.is_empty() {
        return Err(FilterParseError::new(offset, "missing attribute description"));
    }
    if text.contains(|c: char| c.is_whitespace() || c == '*' || c == '\\') {
        return Err(FilterParseError::new(
            offset,
            format!("invalid attribute description '{text}'"),
        ));
    }
    Ok(text.to_string())
}

fn parse_substrings(
    attribute: String,
    value: &str,
    offset: usize,
) -> Result<Filter, FilterParseError> {
    let parts: Vec<&str> = value.split('*').collect();
    let last = parts.len() - 1;

    let mut sub = SubstringFilter {
        attribute,
        initial: None,
        any: Vec::new(),
        final_value: None,
    };
    for (idx, part) in parts.iter().enumerate() {
        if idx == 0 {
            if !part.is_empty() {
                sub.initial = Some(unescape(part, offset)?);
            }
        } else if idx == last {
            if !part.is_empty() {
                sub.final_value = Some(unescape(part, offset)?);
            }
        } else if part.is_empty() {
            return Err(FilterParseError::new(offset, "empty substring between '*'"));
        } else {
            sub.any.push(unescape(part, offset)?);
        }
    }
    Ok(Filter::Substrings(sub))
}

fn parse_extensible(lhs: &str, value: &str, offset: usize) -> Result<Filter, FilterParseError> {
    let mut segments = lhs.split(':');
    let attribute = segments
        .next()
        .filter(|attr| !attr.is_empty())
        .map(|attr| parse_attribute(attr, offset))
        .transpose()?;

    let mut dn_attributes = false;
    let mut matching_rule = None;
    for segment in segments {
        if segment.eq_ignore_ascii_case("dn") && !dn_attributes && matching_rule.is_none() {
            dn_attributes = true;
        } else if matching_rule.is_none() && !segment.is_empty() {
            matching_rule = Some(segment.to_string());
        } else {
            return Err(FilterParseError::new(
                offset,
                format!("invalid extensible match '{lhs}'"),
            ));
        }
    }

    if attribute.is_none() && matching_rule.is_none() {
        return Err(FilterParseError::new(
            offset,
            "extensible match needs an attribute or a matching rule",
        ));
    }

    Ok(Filter::Extensible(ExtensibleMatch {
        matching_rule,
        attribute,
        value: unescape(value, offset)?,
        dn_attributes,
    }))
}

fn unescape(text: &str, offset: usize) -> Result<Vec<u8>, FilterParseError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'\\' {
            let hex = text
                .get(idx + 1..idx + 3)
                .filter(|pair| pair.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| FilterParseError::new(offset + idx, "invalid escape sequence"))?;
            out.push(hex);
            idx += 3;
        } else {
            out.push(bytes[idx]);
            idx += 1;
        }
    }
    Ok(out)
}
