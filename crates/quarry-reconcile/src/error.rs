//! Error types for quarry-reconcile.

use thiserror::Error;

/// Errors from the coordination store.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Creating the marker table failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// An update that must return a row returned none.
    #[error("No result returned for key {0}")]
    NoResult(String),

    /// The store could not be opened when the worker started.
    #[error("Coordination store unavailable: {0}")]
    Unavailable(String),

    /// Underlying libSQL error (connection, query, or row decoding).
    #[error("Coordination store error: {0}")]
    LibSql(#[from] libsql::Error),
}
