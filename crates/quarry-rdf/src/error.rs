//! Error types for RDF handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RdfError {
    /// Writing to or reading from the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An RDF document could not be parsed.
    #[error("RDF parse error: {0}")]
    Parse(#[from] oxrdfio::RdfParseError),

    #[error("Invalid IRI: {0}")]
    Iri(#[from] oxrdf::IriParseError),

    /// A literal failed validation and the policy does not recover.
    #[error("Invalid value for datatype {datatype}: '{lexical}'")]
    InvalidLiteral { lexical: String, datatype: String },

    /// A literal failed validation and no placeholder is known for its datatype.
    #[error("No placeholder known for datatype {datatype} (value '{lexical}')")]
    NoPlaceholder { lexical: String, datatype: String },

    /// The sink was used after the stream ended.
    #[error("Statement sink is closed")]
    Closed,
}
