//! Error types for quarry-convert.

use quarry_core::ResultCode;
use quarry_mapping::MappingError;
use quarry_rdf::RdfError;
use quarry_reconcile::ReconcileError;
use quarry_storage::StorageError;
use thiserror::Error;

/// Reasons a single file fails to convert.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No mapping accepts the file name.
    #[error("no matching mapping found for {file}")]
    NoMapping { file: String },

    /// The mapping asks for something this job cannot do.
    #[error("mapping {mapping} cannot be applied: {reason}")]
    UnsupportedMode { mapping: String, reason: String },

    /// A required collaborator is not configured.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// The file produced data but no record converted.
    #[error("all {failures} records of {file} failed")]
    AllRecordsFailed { file: String, failures: u64 },

    /// The source is neither local nor downloadable.
    #[error("source file not found: {key}")]
    SourceNotFound { key: String },

    /// A document-mode file did not map.
    #[error("mapping failed: {0}")]
    Mapping(#[from] MappingError),

    #[error("transfer failed: {0}")]
    Storage(#[from] StorageError),

    #[error("coordination store failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("writing RDF failed: {0}")]
    Rdf(#[from] RdfError),

    /// The input stream broke off or is not UTF-8.
    #[error("reading input failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Whether retrying the task could help.
    ///
    /// Problems with the mapping or the data are permanent; infrastructure
    /// failures are temporary.
    #[must_use]
    pub const fn result_code(&self) -> ResultCode {
        match self {
            Self::NoMapping { .. }
            | Self::UnsupportedMode { .. }
            | Self::NotConfigured(_)
            | Self::AllRecordsFailed { .. }
            | Self::Mapping(_) => ResultCode::PermanentFailure,
            Self::SourceNotFound { .. }
            | Self::Storage(_)
            | Self::Reconcile(_)
            | Self::Rdf(_)
            | Self::Read(_)
            | Self::Io { .. } => ResultCode::TemporaryFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(
            ConvertError::NoMapping { file: "x".into() }.result_code(),
            ResultCode::PermanentFailure
        );
        assert_eq!(
            ConvertError::AllRecordsFailed { file: "x".into(), failures: 3 }.result_code(),
            ResultCode::PermanentFailure
        );
        assert_eq!(
            ConvertError::SourceNotFound { key: "x".into() }.result_code(),
            ResultCode::TemporaryFailure
        );
        assert_eq!(
            ConvertError::Reconcile(ReconcileError::NoResult("k".into())).result_code(),
            ResultCode::TemporaryFailure
        );
    }
}
