//! Feeding a file's records through the mapper into an output sink.
//!
//! A file is dispatched either as one document or line by line. In line
//! mode every record is isolated: a failing line is logged and counted and
//! the next line is processed. Records of reconciled mappings are routed
//! through the [`UpdateResolver`] before anything is written.

use std::io::{BufRead, Read};
use std::time::{Duration, Instant};

use oxrdf::Quad;
use quarry_core::{JobLog, LineMode, RecordOutcome};
use quarry_mapping::RecordMapper;
use quarry_rdf::{LiteralContext, StatementSink};
use quarry_reconcile::{Decision, RecordStatus, RunMode, UpdateResolver, VersionMarker};
use regex::Regex;

use crate::error::ConvertError;
use crate::naming::is_record_per_line;
use crate::preprocess::Preprocessor;

// ---------------------------------------------------------------------------
// Mode and report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Document,
    Line,
}

impl DispatchMode {
    /// `auto` means line mode for `.jsonl` (optionally gzipped) keys.
    #[must_use]
    pub fn resolve(mode: LineMode, key: &str) -> Self {
        match mode {
            LineMode::Document => Self::Document,
            LineMode::Line => Self::Line,
            LineMode::Auto if is_record_per_line(key) => Self::Line,
            LineMode::Auto => Self::Document,
        }
    }
}

/// Counters for one dispatched file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Records processed (skipped lines excluded).
    pub records: u64,
    pub successes: u64,
    pub failures: u64,
    /// Statements the mapper produced, including those of failed or
    /// dropped records.
    pub produced: u64,
    /// Statements handed to the sink.
    pub written: u64,
    /// Blank lines and skip-pattern matches.
    pub skipped: u64,
    /// The line limit cut the file short.
    pub truncated: bool,
    /// Entities of obsolete records, for the deletion list.
    pub retracted: Vec<String>,
    pub record_time: Duration,
}

impl DispatchReport {
    pub fn record(&mut self, outcome: RecordOutcome, elapsed: Duration) {
        self.records += 1;
        self.produced += outcome.produced;
        if outcome.success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        self.record_time += elapsed;
    }

    /// A file that produced data but had no successful record must not
    /// pass as a success.
    #[must_use]
    pub const fn escalates(&self) -> bool {
        self.successes == 0 && self.failures > 0 && self.produced > 0
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Per-file reconciliation inputs.
pub struct Reconciliation<'a> {
    pub resolver: &'a UpdateResolver,
    pub dataset_iri: &'a str,
    pub kind: &'a str,
    pub marker: VersionMarker,
}

enum Failure {
    /// Isolated to the record.
    Record { produced: u64, reason: String },
    /// Aborts the file.
    File(ConvertError),
}

impl Failure {
    fn record(produced: u64, reason: impl Into<String>) -> Self {
        Self::Record {
            produced,
            reason: reason.into(),
        }
    }
}

impl From<ConvertError> for Failure {
    fn from(error: ConvertError) -> Self {
        Self::File(error)
    }
}

impl From<quarry_reconcile::ReconcileError> for Failure {
    fn from(error: quarry_reconcile::ReconcileError) -> Self {
        Self::File(error.into())
    }
}

/// Compile a configured skip pattern so that it must match a whole line.
///
/// An invalid pattern disables skipping with a warning.
#[must_use]
pub fn compile_skip_pattern(pattern: Option<&str>) -> Option<Regex> {
    let pattern = pattern?;
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(regex) => Some(regex),
        Err(error) => {
            tracing::warn!(%error, pattern, "invalid skip pattern, skipping disabled");
            None
        }
    }
}

pub struct RecordDispatcher<'a> {
    mapper: &'a dyn RecordMapper,
    literals: LiteralContext<'a>,
    preprocessor: Preprocessor,
    skip: Option<&'a Regex>,
    line_limit: Option<u64>,
    reconciliation: Option<Reconciliation<'a>>,
}

impl<'a> RecordDispatcher<'a> {
    #[must_use]
    pub const fn new(mapper: &'a dyn RecordMapper, literals: LiteralContext<'a>) -> Self {
        Self {
            mapper,
            literals,
            preprocessor: Preprocessor::passthrough(),
            skip: None,
            line_limit: None,
            reconciliation: None,
        }
    }

    #[must_use]
    pub const fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Lines matching `skip` are not processed. The regex is used as is.
    #[must_use]
    pub const fn with_skip_pattern(mut self, skip: Option<&'a Regex>) -> Self {
        self.skip = skip;
        self
    }

    /// Stop after `limit` lines.
    #[must_use]
    pub const fn with_line_limit(mut self, limit: Option<u64>) -> Self {
        self.line_limit = limit;
        self
    }

    #[must_use]
    pub fn with_reconciliation(mut self, reconciliation: Option<Reconciliation<'a>>) -> Self {
        self.reconciliation = reconciliation;
        self
    }

    const fn log(&self) -> &JobLog {
        self.literals.log
    }

    /// Dispatch `input` in `mode`.
    ///
    /// The sink is neither started nor ended here.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] for failures that abort the file.
    pub async fn dispatch<R: BufRead, S: StatementSink>(
        &self,
        mode: DispatchMode,
        input: R,
        sink: &mut S,
    ) -> Result<DispatchReport, ConvertError> {
        match mode {
            DispatchMode::Document => self.dispatch_document(input, sink),
            DispatchMode::Line => self.dispatch_lines(input, sink).await,
        }
    }

    /// Map the whole input as one record. Any mapping error fails the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Mapping`] if the document does not map, or an
    /// I/O or write error.
    pub fn dispatch_document<R: Read, S: StatementSink>(
        &self,
        mut input: R,
        sink: &mut S,
    ) -> Result<DispatchReport, ConvertError> {
        let started = Instant::now();
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes).map_err(ConvertError::Read)?;

        let quads = self.mapper.map_record(&bytes, &self.literals)?;
        let produced = quads.len() as u64;

        let mut report = DispatchReport::default();
        write(sink, quads, &mut report)?;
        report.record(RecordOutcome::succeeded(1, produced), started.elapsed());
        Ok(report)
    }

    /// Map the input line by line, isolating per-line failures.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] if the input cannot be read, the sink
    /// fails, or the coordination store fails.
    pub async fn dispatch_lines<R: BufRead, S: StatementSink>(
        &self,
        mut input: R,
        sink: &mut S,
    ) -> Result<DispatchReport, ConvertError> {
        let mut report = DispatchReport::default();
        let mut ordinal = 0u64;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf).map_err(ConvertError::Read)? == 0 {
                break;
            }
            ordinal += 1;
            if let Some(limit) = self.line_limit.filter(|limit| ordinal > *limit) {
                tracing::debug!(limit, "line limit reached, skipping the remaining content");
                report.truncated = true;
                break;
            }
            let bytes = strip_line_end(&buf);
            let Ok(line) = std::str::from_utf8(bytes) else {
                let lossy = String::from_utf8_lossy(bytes);
                self.fail(&mut report, ordinal, 0, "invalid UTF-8", &lossy, Duration::ZERO);
                continue;
            };
            if self.discards(line) {
                tracing::trace!(ordinal, "skipping line");
                report.skipped += 1;
                continue;
            }

            let started = Instant::now();
            match self.process_line(line, sink, &mut report).await {
                Ok(produced) => {
                    report.record(RecordOutcome::succeeded(ordinal, produced), started.elapsed());
                }
                Err(Failure::Record { produced, reason }) => {
                    self.fail(&mut report, ordinal, produced, &reason, line, started.elapsed());
                }
                Err(Failure::File(error)) => return Err(error),
            }
            if ordinal % 1000 == 0 {
                tracing::debug!(lines = ordinal, "processed lines");
            }
        }
        tracing::debug!(lines = ordinal, records = report.records, "finished dispatching lines");
        Ok(report)
    }

    fn fail(
        &self,
        report: &mut DispatchReport,
        ordinal: u64,
        produced: u64,
        reason: &str,
        line: &str,
        elapsed: Duration,
    ) {
        self.log()
            .error(format!("failed to process line {ordinal}: {reason}; line: {line}"));
        report.record(RecordOutcome::failed(ordinal, produced), elapsed);
    }

    fn discards(&self, line: &str) -> bool {
        line.trim().is_empty() || self.skip.is_some_and(|skip| skip.is_match(line))
    }

    fn map(&self, record: &str) -> Result<Vec<Quad>, Failure> {
        self.mapper
            .map_record(record.as_bytes(), &self.literals)
            .map_err(|error| Failure::record(0, error.to_string()))
    }

    /// Returns the number of statements the mapper produced.
    async fn process_line<S: StatementSink>(
        &self,
        line: &str,
        sink: &mut S,
        report: &mut DispatchReport,
    ) -> Result<u64, Failure> {
        let (record, facts) = self
            .preprocessor
            .preprocess(line)
            .map_err(|error| Failure::record(0, format!("invalid JSON: {error}")))?;

        let Some(reconciliation) = &self.reconciliation else {
            let quads = self.map(&record)?;
            let produced = quads.len() as u64;
            write(sink, quads, report)?;
            return Ok(produced);
        };
        let resolver = reconciliation.resolver;

        if resolver.mode() == RunMode::DetectOnly {
            let record_id = facts
                .record_id
                .ok_or_else(|| Failure::record(0, "record has no id"))?;
            let key = resolver.key_for(reconciliation.dataset_iri, reconciliation.kind, &record_id);
            resolver
                .resolve(&key, &reconciliation.marker, &RecordStatus::default(), self.log())
                .await?;
            return Ok(0);
        }

        let quads = self.map(&record)?;
        let produced = quads.len() as u64;
        let record_id = facts
            .record_id
            .ok_or_else(|| Failure::record(produced, "record has no id"))?;
        let (quads, status) = RecordStatus::extract(quads);
        let key = resolver.key_for(reconciliation.dataset_iri, reconciliation.kind, &record_id);

        match resolver
            .resolve(&key, &reconciliation.marker, &status, self.log())
            .await?
        {
            Decision::Keep => write(sink, quads, report)?,
            Decision::Drop => tracing::trace!(record = %record_id, "dropping record"),
            Decision::Retract(entity) => report.retracted.push(entity),
        }
        Ok(produced)
    }
}

/// `line` without its `\n` or `\r\n` terminator.
fn strip_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn write<S: StatementSink>(
    sink: &mut S,
    quads: Vec<Quad>,
    report: &mut DispatchReport,
) -> Result<(), ConvertError> {
    for quad in quads {
        sink.handle(quad)?;
        report.written += 1;
    }
    Ok(())
}
