//! Cross-cutting error types for Quarry.
//!
//! Domain-specific errors (e.g., `MappingError`, `ReconcileError`) are defined in
//! their respective crates. Per-file errors converge in `quarry-convert`.

use thiserror::Error;

/// Errors that can be raised by any Quarry crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A JSON document could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
