//! Record identity and version ordering.

use std::cmp::Ordering;
use std::fmt;

use sha2::{Digest, Sha256};

/// Identity of a logical record across deliveries.
///
/// The SHA-256 of upload bucket, dataset IRI, record type and record id,
/// each preceded by its byte length, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolutionKey(String);

impl ResolutionKey {
    #[must_use]
    pub fn derive(bucket: &str, dataset_iri: &str, kind: &str, record_id: &str) -> Self {
        let mut hasher = Sha256::new();
        for part in [bucket, dataset_iri, kind, record_id] {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque version of one delivery of a record (an object version id, or
/// the object key when the store is unversioned).
///
/// Ordered byte-wise lexicographically, the same order `SQLite` applies to
/// `TEXT` under the default `BINARY` collation. Later deliveries must carry
/// markers that sort higher: fixed-width, zero-padded identifiers satisfy
/// this, arbitrary numbers or timestamps of varying width do not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionMarker(String);

impl VersionMarker {
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for VersionMarker {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_bytes().cmp(other.0.as_bytes())
    }
}

impl PartialOrd for VersionMarker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionMarker {
    fn from(marker: &str) -> Self {
        Self::new(marker)
    }
}
