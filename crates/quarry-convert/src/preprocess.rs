//! Line preprocessing: record id extraction, hierarchy enrichment, and list
//! wrapping.

use quarry_config::PreprocessingConfig;
use serde_json::{Map, Value, json};

/// Fields copied from a parent object into its children.
const INHERITED_FIELDS: [&str; 4] = ["id", "name", "domain", "ocid"];
const PARENT_PREFIX: &str = "__parent_";
const PARENT_KEY: &str = "__parentKey";
const INDEX_FIELD: &str = "__index";

/// Facts extracted from a record while preprocessing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFacts {
    /// `ocid` when present, else `id`.
    pub record_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessor {
    list: bool,
    parent: bool,
    index: bool,
    log: bool,
}

impl Preprocessor {
    #[must_use]
    pub const fn new(config: &PreprocessingConfig) -> Self {
        Self {
            list: config.list,
            parent: config.parent,
            index: config.index,
            log: config.log,
        }
    }

    /// Pass lines through untouched apart from id extraction.
    #[must_use]
    pub const fn passthrough() -> Self {
        Self {
            list: false,
            parent: false,
            index: false,
            log: false,
        }
    }

    /// Preprocess one line.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the line is not valid JSON.
    pub fn preprocess(&self, line: &str) -> Result<(String, RecordFacts), serde_json::Error> {
        let record: Value = serde_json::from_str(line)?;
        let facts = RecordFacts {
            record_id: record_id(&record),
        };

        let record = match record {
            Value::Object(object) if self.parent || self.index => Value::Object(self.enrich(object)),
            other => other,
        };
        let output = if self.list {
            json!({ "list": [record] }).to_string()
        } else if self.parent || self.index {
            record.to_string()
        } else {
            line.to_string()
        };

        if self.log {
            tracing::debug!(original = line, preprocessed = %output, "preprocessed line");
        }
        Ok((output, facts))
    }

    /// Copy parent context into every nested object, returning a new tree.
    ///
    /// Objects directly under a field are visited only when parent
    /// enrichment is on; objects inside arrays are always visited.
    fn enrich(&self, object: Map<String, Value>) -> Map<String, Value> {
        let inherited: Vec<(String, Value)> = object
            .iter()
            .filter(|(key, _)| key.starts_with("__") || INHERITED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (format!("{PARENT_PREFIX}{key}"), value.clone()))
            .collect();

        object
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Object(child) if self.parent => {
                        Value::Object(self.enrich(adopt(child, &key, &inherited)))
                    }
                    Value::Array(items) => Value::Array(
                        items
                            .into_iter()
                            .enumerate()
                            .map(|(index, item)| match item {
                                Value::Object(child) => {
                                    let mut child = if self.parent {
                                        adopt(child, &key, &inherited)
                                    } else {
                                        child
                                    };
                                    if self.index {
                                        child.insert(INDEX_FIELD.to_string(), Value::from(index));
                                    }
                                    Value::Object(self.enrich(child))
                                }
                                other => other,
                            })
                            .collect(),
                    ),
                    other => other,
                };
                (key, value)
            })
            .collect()
    }
}

fn adopt(
    mut child: Map<String, Value>,
    parent_key: &str,
    inherited: &[(String, Value)],
) -> Map<String, Value> {
    child.insert(PARENT_KEY.to_string(), Value::from(parent_key));
    for (key, value) in inherited {
        child.insert(key.clone(), value.clone());
    }
    child
}

fn record_id(record: &Value) -> Option<String> {
    ["ocid", "id"]
        .into_iter()
        .find_map(|field| match record.get(field)? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
}
