//! Job-scoped log sink.
//!
//! Components that must report into the log of the running job (literal
//! recovery warnings, per-line failures, file verdicts) receive a [`JobLog`]
//! explicitly. Entries are mirrored to `tracing` and retained so the caller
//! can persist them after the job.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobLogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for JobLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

/// One retained log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLogEntry {
    pub ts: DateTime<Utc>,
    pub job: String,
    pub level: JobLogLevel,
    pub message: String,
}

/// Cloneable handle to the log of one job run. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct JobLog {
    job_id: Arc<str>,
    entries: Arc<Mutex<Vec<JobLogEntry>>>,
}

impl JobLog {
    #[must_use]
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Arc::from(job_id.into()),
            entries: Arc::default(),
        }
    }

    #[must_use]
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(job = %self.job_id, "{message}");
        self.push(JobLogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(job = %self.job_id, "{message}");
        self.push(JobLogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(job = %self.job_id, "{message}");
        self.push(JobLogLevel::Error, message);
    }

    /// Snapshot of all entries so far.
    #[must_use]
    pub fn entries(&self) -> Vec<JobLogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of entries at `level`.
    #[must_use]
    pub fn count(&self, level: JobLogLevel) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.level == level)
            .count()
    }

    fn push(&self, level: JobLogLevel, message: String) {
        let entry = JobLogEntry {
            ts: Utc::now(),
            job: self.job_id.to_string(),
            level,
            message,
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let log = JobLog::new("job-1");
        let clone = log.clone();

        log.info("started");
        clone.warn("line 2 failed");
        clone.error("file failed");

        assert_eq!(log.entries().len(), 3);
        assert_eq!(log.count(JobLogLevel::Warn), 1);
        assert_eq!(log.count(JobLogLevel::Error), 1);
        assert_eq!(log.entries()[1].message, "line 2 failed");
        assert_eq!(log.entries()[0].job, "job-1");
    }

    #[test]
    fn entry_serializes_level_snake_case() {
        let log = JobLog::new("j");
        log.warn("w");
        let value = serde_json::to_value(&log.entries()[0]).unwrap();
        assert_eq!(value["level"], "warn");
        assert_eq!(value["job"], "j");
    }
}
