//! Error types for mapping loading and evaluation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The mapping configuration document is malformed.
    #[error("Invalid mapping configuration: {0}")]
    Config(#[from] quarry_core::CoreError),

    /// An include or exclude pattern does not compile.
    #[error("Invalid {kind} pattern for mapping '{id}': {source}")]
    Pattern {
        id: String,
        kind: &'static str,
        source: regex::Error,
    },

    /// Mapping rules are present but not usable.
    #[error("Invalid mapping rules: {0}")]
    Rules(String),

    /// A record could not be mapped.
    #[error("Record error: {0}")]
    Record(String),

    /// The record is not valid JSON.
    #[error("Record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// RDF parsing or literal construction failed.
    #[error(transparent)]
    Rdf(#[from] quarry_rdf::RdfError),
}
