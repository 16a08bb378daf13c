//! Last-write-wins decisions per record.

use quarry_core::JobLog;

use crate::error::ReconcileError;
use crate::key::{ResolutionKey, VersionMarker};
use crate::status::RecordStatus;
use crate::store::CoordinationStore;

/// How a job treats records of reconciled mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Record the highest marker per key; emit nothing.
    DetectOnly,
    /// Full reprocessing: keep only the version stored during detection.
    ColdStart,
    /// Keep everything except obsolete records, which are retracted.
    Incremental,
}

impl RunMode {
    /// Detect-only takes precedence over cold start.
    #[must_use]
    pub const fn from_flags(detect_only: bool, cold_start: bool) -> Self {
        if detect_only {
            Self::DetectOnly
        } else if cold_start {
            Self::ColdStart
        } else {
            Self::Incremental
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DetectOnly => "detect-only",
            Self::ColdStart => "cold-start",
            Self::Incremental => "incremental",
        }
    }

    /// Whether deletion lists are produced in this mode.
    #[must_use]
    pub const fn emits_deletions(self) -> bool {
        matches!(self, Self::Incremental)
    }
}

/// What happens to one record's statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Drop,
    /// Drop, and list the entity for downstream deletion.
    Retract(String),
}

impl Decision {
    #[must_use]
    pub const fn keeps(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// Decide a record's fate from the stored marker, its own marker, its
/// status, and the run mode.
///
/// Detect-only never keeps anything. A cold start keeps a record only when
/// its marker equals the stored one and it is not obsolete; it never
/// retracts. An incremental run keeps every record that is not obsolete and
/// retracts the rest.
#[must_use]
pub fn decide(
    mode: RunMode,
    stored: Option<&VersionMarker>,
    marker: &VersionMarker,
    status: &RecordStatus,
) -> Decision {
    match mode {
        RunMode::DetectOnly => Decision::Drop,
        RunMode::ColdStart => {
            if !status.obsolete && stored == Some(marker) {
                Decision::Keep
            } else {
                Decision::Drop
            }
        }
        RunMode::Incremental => match (&status.entity, status.obsolete) {
            (Some(entity), true) => Decision::Retract(entity.clone()),
            (None, true) => Decision::Drop,
            (_, false) => Decision::Keep,
        },
    }
}

/// Applies [`decide`] against the coordination store.
pub struct UpdateResolver {
    store: CoordinationStore,
    mode: RunMode,
    bucket: String,
}

impl UpdateResolver {
    /// `bucket` is the upload bucket, the first component of every key.
    pub fn new(store: CoordinationStore, mode: RunMode, bucket: impl Into<String>) -> Self {
        Self {
            store,
            mode,
            bucket: bucket.into(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    #[must_use]
    pub const fn store(&self) -> &CoordinationStore {
        &self.store
    }

    /// The resolution key of a record in this job.
    #[must_use]
    pub fn key_for(&self, dataset_iri: &str, kind: &str, record_id: &str) -> ResolutionKey {
        ResolutionKey::derive(&self.bucket, dataset_iri, kind, record_id)
    }

    /// Decide one record.
    ///
    /// In detect-only mode this raises the stored marker and drops the
    /// record; a cold start reads the stored marker; an incremental run
    /// never touches the store.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] if the coordination store fails. Nothing
    /// is retried.
    pub async fn resolve(
        &self,
        key: &ResolutionKey,
        marker: &VersionMarker,
        status: &RecordStatus,
        log: &JobLog,
    ) -> Result<Decision, ReconcileError> {
        match self.mode {
            RunMode::DetectOnly => {
                let stored = self.store.update_max(key, marker).await?;
                tracing::trace!(%key, %marker, %stored, "recorded version");
                Ok(Decision::Drop)
            }
            RunMode::ColdStart => {
                let stored = self.store.get(key).await?;
                if stored.is_none() {
                    log.warn(format!(
                        "no stored version for record key {key} (version {marker}), dropping record"
                    ));
                }
                Ok(decide(self.mode, stored.as_ref(), marker, status))
            }
            RunMode::Incremental => Ok(decide(self.mode, None, marker, status)),
        }
    }
}
