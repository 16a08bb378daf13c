//! Aggregate conversion statistics for a worker's lifetime.

use std::fmt;
use std::time::Duration;

use crate::dispatcher::DispatchReport;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    files: u64,
    records: u64,
    statements: u64,
    successes: u64,
    failures: u64,
    file_time: Duration,
    record_time: Duration,
}

impl ConversionStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account one input file, whatever its verdict.
    pub fn add_file(&mut self, elapsed: Duration) {
        self.files += 1;
        self.file_time += elapsed;
    }

    /// Account the records of one dispatch.
    pub fn add_records(&mut self, report: &DispatchReport) {
        self.records += report.records;
        self.statements += report.produced;
        self.successes += report.successes;
        self.failures += report.failures;
        self.record_time += report.record_time;
    }

    #[must_use]
    pub const fn files(&self) -> u64 {
        self.files
    }

    #[must_use]
    pub const fn records(&self) -> u64 {
        self.records
    }

    #[must_use]
    pub const fn statements(&self) -> u64 {
        self.statements
    }

    #[must_use]
    pub const fn successes(&self) -> u64 {
        self.successes
    }

    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    #[must_use]
    pub fn average_file_millis(&self) -> f64 {
        average_millis(self.file_time, self.files)
    }

    #[must_use]
    pub fn average_record_millis(&self) -> f64 {
        average_millis(self.record_time, self.records)
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "processed {} input files (avg {:.1}ms per input file), {} JSON docs (avg {:.3}ms per JSON doc), \
             {} RDF statements, {} successful, {} failed",
            self.files,
            self.average_file_millis(),
            self.records,
            self.average_record_millis(),
            self.statements,
            self.successes,
            self.failures,
        )
    }
}

#[allow(clippy::cast_precision_loss)]
fn average_millis(total: Duration, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total.as_secs_f64() * 1000.0 / count as f64
    }
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
