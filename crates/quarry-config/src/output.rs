//! Output serialization settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_format() -> String {
    String::from("trig")
}

const fn default_compressed() -> bool {
    true
}

const fn default_batch_size() -> usize {
    1000
}

fn default_context_base() -> String {
    String::from("https://example.com/")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// RDF serialization, by file extension (`trig`, `nq`) or media type.
    #[serde(default = "default_format")]
    pub format: String,

    /// Gzip the output artifact.
    #[serde(default = "default_compressed")]
    pub compressed: bool,

    /// Statements buffered before a flush to the writer.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Namespace the per-file named graph IRI is derived from.
    #[serde(default = "default_context_base")]
    pub context_base: String,

    /// Namespace prefixes declared in the output (`prefix -> IRI`).
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            compressed: default_compressed(),
            batch_size: default_batch_size(),
            context_base: default_context_base(),
            prefixes: BTreeMap::new(),
        }
    }
}

impl OutputConfig {
    /// Batch size clamped to at least one statement.
    pub fn effective_batch_size(&self) -> usize {
        if self.batch_size == 0 {
            tracing::warn!("output.batch_size must be at least 1, using 1");
            1
        } else {
            self.batch_size
        }
    }
}
