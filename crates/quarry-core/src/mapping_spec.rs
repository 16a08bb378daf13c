//! Mapping specifications as declared in the mapping configuration document.
//!
//! The document has the shape:
//!
//! ```json
//! { "mappings": [ { "id": "pubs", "mappingFiles": ["pubs.rml.ttl"],
//!                   "sourceFileIncludePattern": "pubs/.*\\.jsonl" } ] }
//! ```
//!
//! Specs are immutable once loaded; compilation into an executable mapping
//! happens in `quarry-mapping`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Well-known processing hints.
pub mod hints {
    /// Records of this mapping take part in last-write-wins reconciliation.
    pub const LAST_UPDATE: &str = "last-update";
}

// ---------------------------------------------------------------------------
// LineMode
// ---------------------------------------------------------------------------

/// How a source file is split into records before mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineMode {
    /// Line mode for `.jsonl` files, document mode for everything else.
    #[default]
    Auto,
    /// The whole file is one record.
    Document,
    /// Every line is one record.
    Line,
}

impl LineMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Document => "document",
            Self::Line => "line",
        }
    }
}

impl fmt::Display for LineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MappingSpec
// ---------------------------------------------------------------------------

/// A single mapping declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSpec {
    /// Unique identifier. Also used as the record "type" when deriving contexts.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Mapping-rule files, relative to the configuration document.
    #[serde(default)]
    pub mapping_files: Vec<String>,

    /// Explicit named graph for all output of this mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_iri: Option<String>,

    /// Dataset qualifier used to derive the context when no `dataset_iri` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Full-match regular expression a file name must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file_include_pattern: Option<String>,

    /// Full-match regular expression a file name must not satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file_exclude_pattern: Option<String>,

    /// Free-form processing hints, see [`hints`].
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub processing_hints: BTreeSet<String>,

    #[serde(default)]
    pub line_mode: LineMode,
}

impl MappingSpec {
    /// Create a spec with only an id set.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            mapping_files: Vec::new(),
            dataset_iri: None,
            dataset: None,
            source_file_include_pattern: None,
            source_file_exclude_pattern: None,
            processing_hints: BTreeSet::new(),
            line_mode: LineMode::Auto,
        }
    }

    #[must_use]
    pub fn with_mapping_file(mut self, file: impl Into<String>) -> Self {
        self.mapping_files.push(file.into());
        self
    }

    #[must_use]
    pub fn with_dataset_iri(mut self, iri: impl Into<String>) -> Self {
        self.dataset_iri = Some(iri.into());
        self
    }

    #[must_use]
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    #[must_use]
    pub fn with_include_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.source_file_include_pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn with_exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.source_file_exclude_pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.processing_hints.insert(hint.into());
        self
    }

    #[must_use]
    pub const fn with_line_mode(mut self, mode: LineMode) -> Self {
        self.line_mode = mode;
        self
    }

    /// Registry key for this spec.
    #[must_use]
    pub fn normalized_id(&self) -> String {
        self.id.to_lowercase()
    }

    #[must_use]
    pub fn has_hint(&self, hint: &str) -> bool {
        self.processing_hints.contains(hint)
    }
}

// ---------------------------------------------------------------------------
// MappingConfig
// ---------------------------------------------------------------------------

/// The mapping configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub mappings: Vec<MappingSpec>,
}

impl MappingConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Json`] if the document is not valid JSON or does
    /// not have the expected shape.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}
