//! The JSONPath subset used by logical-source iterators and references.
//!
//! Supported steps: `.name`, `['name']`, `[n]`, `[*]` and `.*`. Iterators use
//! strict semantics; references flatten arrays at every step, so
//! `authors.name` yields the name of every author.

use serde_json::Value;

use crate::error::MappingError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Field(String),
    Index(usize),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    source: String,
    steps: Vec<Step>,
}

impl JsonPath {
    /// Parse an expression. A leading `$` or `@` is optional.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Rules`] for unsupported syntax.
    pub fn parse(expression: &str) -> Result<Self, MappingError> {
        let invalid = |reason: &str| {
            MappingError::Rules(format!("unsupported JSONPath '{expression}': {reason}"))
        };

        let mut rest = expression.trim();
        rest = rest
            .strip_prefix('$')
            .or_else(|| rest.strip_prefix('@'))
            .unwrap_or(rest);

        let mut steps = Vec::new();
        let mut first = true;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('[') {
                let end = after.find(']').ok_or_else(|| invalid("unclosed '['"))?;
                let inner = after[..end].trim();
                rest = &after[end + 1..];
                let step = if inner == "*" {
                    Step::Wildcard
                } else if let Some(name) = inner
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
                {
                    Step::Field(name.to_string())
                } else {
                    Step::Index(inner.parse().map_err(|_| invalid("bad index"))?)
                };
                steps.push(step);
            } else {
                let body = match rest.strip_prefix('.') {
                    Some(body) => body,
                    None if first => rest,
                    None => return Err(invalid("expected '.' or '['")),
                };
                if body.starts_with('.') {
                    return Err(invalid("recursive descent is not supported"));
                }
                let end = body.find(['.', '[']).unwrap_or(body.len());
                let name = &body[..end];
                if name.is_empty() {
                    return Err(invalid("empty field name"));
                }
                steps.push(if name == "*" {
                    Step::Wildcard
                } else {
                    Step::Field(name.to_string())
                });
                rest = &body[end..];
            }
            first = false;
        }

        Ok(Self {
            source: expression.to_string(),
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Items selected by this path used as an iterator.
    pub fn select<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for step in &self.steps {
            let mut next = Vec::new();
            for value in current {
                match (step, value) {
                    (Step::Field(name), Value::Object(map)) => next.extend(map.get(name)),
                    (Step::Index(index), Value::Array(items)) => next.extend(items.get(*index)),
                    (Step::Wildcard, Value::Array(items)) => next.extend(items.iter()),
                    (Step::Wildcard, Value::Object(map)) => next.extend(map.values()),
                    _ => {}
                }
            }
            current = next;
        }
        current
    }

    /// Scalar values referenced from `item`, with arrays flattened.
    ///
    /// `null`, objects, and missing fields contribute nothing.
    pub fn values(&self, item: &Value) -> Vec<Scalar> {
        let mut current = vec![item];
        for step in &self.steps {
            let mut next = Vec::new();
            for value in current {
                collect_step(step, value, &mut next);
            }
            current = next;
        }

        let mut out = Vec::new();
        for value in current {
            flatten_scalars(value, &mut out);
        }
        out
    }
}

fn collect_step<'a>(step: &Step, value: &'a Value, out: &mut Vec<&'a Value>) {
    match (step, value) {
        (Step::Field(name), Value::Object(map)) => out.extend(map.get(name)),
        (Step::Field(_), Value::Array(items)) => {
            for item in items {
                collect_step(step, item, out);
            }
        }
        (Step::Index(index), Value::Array(items)) => out.extend(items.get(*index)),
        (Step::Wildcard, Value::Array(items)) => out.extend(items.iter()),
        (Step::Wildcard, Value::Object(map)) => out.extend(map.values()),
        _ => {}
    }
}

fn flatten_scalars(value: &Value, out: &mut Vec<Scalar>) {
    match value {
        Value::String(text) => out.push(Scalar::String(text.clone())),
        Value::Number(number) if number.is_i64() || number.is_u64() => {
            out.push(Scalar::Integer(number.to_string()));
        }
        Value::Number(number) => out.push(Scalar::Double(number.to_string())),
        Value::Bool(flag) => out.push(Scalar::Boolean(*flag)),
        Value::Array(items) => {
            for item in items {
                flatten_scalars(item, out);
            }
        }
        Value::Null | Value::Object(_) => {}
    }
}

/// A referenced JSON scalar, keeping its JSON type for natural datatypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    String(String),
    Integer(String),
    Double(String),
    Boolean(bool),
}

impl Scalar {
    /// Lexical form.
    pub fn lexical(&self) -> String {
        match self {
            Self::String(text) | Self::Integer(text) | Self::Double(text) => text.clone(),
            Self::Boolean(flag) => flag.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn iterator_selects_array_elements() {
        let root = json!({"list": [{"id": 1}, {"id": 2}]});
        let path = JsonPath::parse("$.list[*]").unwrap();
        assert_eq!(path.select(&root), vec![&json!({"id": 1}), &json!({"id": 2})]);
    }

    #[test]
    fn root_iterator_selects_document() {
        let root = json!({"id": 1});
        assert_eq!(JsonPath::parse("$").unwrap().select(&root), vec![&root]);
    }

    #[test]
    fn strict_iterator_does_not_flatten() {
        let root = json!({"list": [{"id": 1}]});
        assert!(JsonPath::parse("$.list.id").unwrap().select(&root).is_empty());
    }

    #[test]
    fn references_flatten_arrays() {
        let item = json!({"authors": [{"name": "Ada"}, {"name": "Grace"}], "id": 7});
        let names = JsonPath::parse("authors.name").unwrap().values(&item);
        assert_eq!(
            names,
            vec![Scalar::String("Ada".into()), Scalar::String("Grace".into())]
        );
        assert_eq!(
            JsonPath::parse("id").unwrap().values(&item),
            vec![Scalar::Integer("7".into())]
        );
    }

    #[test]
    fn bracket_and_index_steps() {
        let item = json!({"a b": [10, 20.5, true]});
        let path = JsonPath::parse("$['a b'][1]").unwrap();
        assert_eq!(path.values(&item), vec![Scalar::Double("20.5".into())]);
        let all = JsonPath::parse("['a b'][*]").unwrap().values(&item);
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].lexical(), "true");
    }

    #[test]
    fn missing_and_null_yield_nothing() {
        let item = json!({"a": null});
        assert!(JsonPath::parse("a").unwrap().values(&item).is_empty());
        assert!(JsonPath::parse("b.c").unwrap().values(&item).is_empty());
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(JsonPath::parse("$..name").is_err());
        assert!(JsonPath::parse("$.list[").is_err());
        assert!(JsonPath::parse("$.list[?(@.x)]").is_err());
    }
}
