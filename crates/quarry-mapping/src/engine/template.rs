//! `rr:template` strings such as `https://example.com/person/{id}`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::json_path::JsonPath;
use crate::error::MappingError;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([^}]+)\}").unwrap_or_else(|_| unreachable!("placeholder pattern is valid"))
});

#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Reference(JsonPath),
}

#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Split a template into text and placeholder segments.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Rules`] if a placeholder is not a supported
    /// reference.
    pub fn parse(template: &str) -> Result<Self, MappingError> {
        let mut segments = Vec::new();
        let mut last = 0;
        for captures in PLACEHOLDER_RE.captures_iter(template) {
            let (Some(whole), Some(reference)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Text(template[last..whole.start()].to_string()));
            }
            segments.push(Segment::Reference(JsonPath::parse(reference.as_str())?));
            last = whole.end();
        }
        if last < template.len() {
            segments.push(Segment::Text(template[last..].to_string()));
        }
        Ok(Self { segments })
    }

    /// Expand against `item`, one result per combination of referenced values.
    ///
    /// A placeholder without a value produces no result. With `escape` set,
    /// substituted values are IRI-escaped.
    pub fn expand(&self, item: &Value, escape: bool) -> Vec<String> {
        let mut results = vec![String::new()];
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => {
                    for result in &mut results {
                        result.push_str(text);
                    }
                }
                Segment::Reference(path) => {
                    let values = path.values(item);
                    if values.is_empty() {
                        return Vec::new();
                    }
                    let mut next = Vec::with_capacity(results.len() * values.len());
                    for prefix in &results {
                        for value in &values {
                            let lexical = value.lexical();
                            let value = if escape { iri_escape(&lexical) } else { lexical };
                            next.push(format!("{prefix}{value}"));
                        }
                    }
                    results = next;
                }
            }
        }
        results
    }
}

/// Percent-encode everything outside the unreserved, sub-delim, `:` and `@`
/// characters.
pub fn iri_escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '~' => result.push(c),
            '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' => result.push(c),
            ':' | '@' => result.push(c),
            _ => {
                let mut buf = [0; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    result.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    result
}
