//! Converting one task's file end to end.
//!
//! mapping -> context -> source -> BatchingSink(FixedContextSink(writer))
//! -> dispatch -> finalize -> deletion list -> upload -> cleanup.

use std::io::Write;
use std::path::{Path, PathBuf};

use quarry_config::QuarryConfig;
use quarry_core::{BatchTask, JobLog, LineMode, MappingSpec, hints};
use quarry_mapping::{ContextAssigner, MappingRegistry};
use quarry_rdf::{
    BatchingSink, CollectingSink, FixedContextSink, LiteralContext, LiteralConversionMode,
    LiteralPolicy, RdfError, RdfFormat, RdfWriterSink, StatementSink, resolve_output_format,
};
use quarry_reconcile::{ReconcileError, RunMode, UpdateResolver, VersionMarker};
use quarry_storage::{ObjectStorage, OutputWriter, ScratchFile, StorageError, open_input};
use regex::Regex;

use crate::dispatcher::{
    DispatchMode, DispatchReport, Reconciliation, RecordDispatcher, compile_skip_pattern,
};
use crate::error::ConvertError;
use crate::naming::{deletion_list_name, output_name};
use crate::preprocess::Preprocessor;
use crate::stats::ConversionStats;

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub mapping: String,
    pub context: String,
    pub mode: DispatchMode,
    pub dispatch: DispatchReport,
    /// Name of the RDF output, when one was written.
    pub output: Option<String>,
    /// Name of the deletion list, when one was written.
    pub deletion_list: Option<String>,
    /// Outputs were put to the upload bucket.
    pub uploaded: bool,
    pub detect_only: bool,
}

impl FileReport {
    /// Human-readable verdict for the task result.
    #[must_use]
    pub fn message(&self) -> String {
        if self.detect_only {
            "last-update detection completed".to_string()
        } else {
            format!("{} RDF statements written", self.dispatch.written)
        }
    }
}

/// Converts files using the mappings and settings fixed at startup.
pub struct FileConversionOrchestrator {
    config: QuarryConfig,
    registry: MappingRegistry,
    contexts: ContextAssigner,
    literals: LiteralPolicy,
    preprocessor: Preprocessor,
    skip: Option<Regex>,
    format: RdfFormat,
    storage: ObjectStorage,
    resolver: Option<UpdateResolver>,
    /// Why the configured coordination store could not be opened.
    coordination_failure: Option<String>,
    run_mode: RunMode,
}

impl FileConversionOrchestrator {
    /// `resolver` is required only for mappings with the `last-update` hint.
    #[must_use]
    pub fn new(
        config: QuarryConfig,
        registry: MappingRegistry,
        storage: ObjectStorage,
        resolver: Option<UpdateResolver>,
    ) -> Self {
        let run_mode = RunMode::from_flags(
            config.process.detect_last_update_only,
            config.process.cold_start,
        );
        let literals = LiteralPolicy::new(LiteralConversionMode::from_config(
            &config.mappings.literal_conversion_mode,
        ));
        Self {
            contexts: ContextAssigner::new(config.output.context_base.clone()),
            preprocessor: Preprocessor::new(&config.preprocessing),
            skip: compile_skip_pattern(config.preprocessing.active_skip_pattern()),
            format: resolve_output_format(&config.output.format),
            literals,
            config,
            registry,
            storage,
            resolver,
            coordination_failure: None,
            run_mode,
        }
    }

    /// Record that the configured coordination store could not be opened.
    ///
    /// Files of reconciled mappings then fail with a temporary
    /// [`ConvertError::Reconcile`]; all other files convert normally.
    #[must_use]
    pub fn with_coordination_failure(mut self, error: &ReconcileError) -> Self {
        self.coordination_failure = Some(error.to_string());
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    #[must_use]
    pub const fn format(&self) -> RdfFormat {
        self.format
    }

    /// Convert the file of `task`.
    ///
    /// Local copies are removed per the download and upload delete flags on
    /// every exit path; a failed file never leaves a partial output behind
    /// when `upload.delete` is set.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] describing why the file failed.
    pub async fn convert(
        &self,
        task: &BatchTask,
        log: &JobLog,
        stats: &mut ConversionStats,
    ) -> Result<FileReport, ConvertError> {
        let key = task.source_location.as_str();
        let mapping = self
            .registry
            .select_for(key)
            .ok_or_else(|| ConvertError::NoMapping {
                file: key.to_string(),
            })?;
        let spec = mapping.spec();
        let reconciled = spec.has_hint(hints::LAST_UPDATE);
        let mode = dispatch_mode(spec, key, reconciled)?;
        let context = self.contexts.context_for_spec(spec);
        let detect_only = self.run_mode == RunMode::DetectOnly;

        tracing::info!(
            file = key,
            mapping = mapping.id(),
            context = context.as_str(),
            mode = ?mode,
            run = self.run_mode.as_str(),
            "converting file"
        );

        let mut report = FileReport {
            mapping: mapping.id().to_string(),
            context: context.as_str().to_string(),
            mode,
            dispatch: DispatchReport::default(),
            output: None,
            deletion_list: None,
            uploaded: false,
            detect_only,
        };

        if detect_only && !reconciled {
            log.info(format!(
                "skipping {key}: mapping {} has no {} hint",
                mapping.id(),
                hints::LAST_UPDATE
            ));
            return Ok(report);
        }

        let reconciliation = if reconciled {
            let resolver = self.resolver()?;
            Some(Reconciliation {
                resolver,
                dataset_iri: spec.dataset_iri.as_deref().unwrap_or_default(),
                kind: mapping.kind(),
                marker: VersionMarker::new(task.version_marker()),
            })
        } else {
            None
        };

        let source = self.acquire(task).await?;
        let input = open_input(source.path())?;
        let dispatcher = RecordDispatcher::new(mapping.mapper(), LiteralContext::new(&self.literals, log))
            .with_preprocessor(self.preprocessor)
            .with_skip_pattern(self.skip.as_ref())
            .with_line_limit(self.config.process.line_limit())
            .with_reconciliation(reconciliation);

        if detect_only {
            let mut discard = CollectingSink::new();
            report.dispatch = dispatcher.dispatch(mode, input, &mut discard).await?;
            stats.add_records(&report.dispatch);
            return Ok(report);
        }

        let compressed = self.config.output.compressed;
        let output = output_name(key, self.format, compressed);
        let output_path = self.config.paths.output_dir.join(&output);
        let mut output_guard = ScratchFile::new(&output_path, self.config.upload.delete);

        let writer = RdfWriterSink::new(
            self.format,
            &self.config.output.prefixes,
            OutputWriter::create(&output_path, compressed)?,
        )?;
        let mut pipeline = BatchingSink::new(
            FixedContextSink::new(writer, context),
            self.config.output.effective_batch_size(),
        );
        pipeline.start()?;
        report.dispatch = dispatcher.dispatch(mode, input, &mut pipeline).await?;
        stats.add_records(&report.dispatch);
        pipeline.end()?;
        pipeline
            .into_inner()
            .into_inner()
            .into_inner()
            .ok_or(RdfError::Closed)?
            .finish()
            .map_err(|e| ConvertError::io(&output_path, e))?;

        if report.dispatch.escalates() {
            return Err(ConvertError::AllRecordsFailed {
                file: key.to_string(),
                failures: report.dispatch.failures,
            });
        }
        report.output = Some(output.clone());

        let mut deletion_guard = None;
        if reconciled && self.run_mode.emits_deletions() {
            let name = deletion_list_name(&output);
            let path = self.config.paths.output_dir.join(&name);
            let guard = ScratchFile::new(&path, self.config.upload.delete);
            write_deletion_list(&path, &report.dispatch.retracted)?;
            deletion_guard = Some(guard);
            report.deletion_list = Some(name);
        }

        if self.config.upload.is_configured() {
            let bucket = &self.config.upload.bucket;
            self.storage.upload(bucket, &output, &output_path).await?;
            if let (Some(name), Some(guard)) = (&report.deletion_list, &deletion_guard) {
                self.storage.upload(bucket, name, guard.path()).await?;
            }
            report.uploaded = true;
            tracing::info!(bucket = %bucket, output = %output, "uploaded output");
        } else {
            output_guard.keep();
            if let Some(guard) = deletion_guard.as_mut() {
                guard.keep();
            }
        }
        Ok(report)
    }

    fn resolver(&self) -> Result<&UpdateResolver, ConvertError> {
        match (&self.resolver, &self.coordination_failure) {
            (Some(resolver), _) => Ok(resolver),
            (None, Some(reason)) => Err(ReconcileError::Unavailable(reason.clone()).into()),
            (None, None) => Err(ConvertError::NotConfigured("coordination store")),
        }
    }

    /// Locate the task's source locally, or download it.
    async fn acquire(&self, task: &BatchTask) -> Result<ScratchFile, ConvertError> {
        let key = task.source_location.as_str();
        let local = local_path(&self.config.paths.input_dir, key);
        if local.is_file() {
            tracing::debug!(path = %local.display(), "using local source");
            return Ok(ScratchFile::new(local, false));
        }

        let not_found = || ConvertError::SourceNotFound {
            key: key.to_string(),
        };
        if !self.config.download.enabled {
            return Err(not_found());
        }
        let bucket = task.bucket_name().ok_or_else(not_found)?;
        let dest = local_path(&self.config.paths.download_dir, key);
        let guard = ScratchFile::new(&dest, self.config.download.delete);
        let version = task.object_version();

        match self.storage.download(bucket, key, version, &dest).await {
            Ok(bytes) => {
                tracing::debug!(bucket, key, bytes, "downloaded source");
                Ok(guard)
            }
            Err(StorageError::NotFound { .. }) => Err(not_found()),
            Err(error) => Err(error.into()),
        }
    }
}

/// Line or document mode for `spec`. Reconciliation works per line, so the
/// hint turns `auto` into line mode and rejects explicit document mode.
fn dispatch_mode(spec: &MappingSpec, key: &str, reconciled: bool) -> Result<DispatchMode, ConvertError> {
    if !reconciled {
        return Ok(DispatchMode::resolve(spec.line_mode, key));
    }
    match spec.line_mode {
        LineMode::Auto | LineMode::Line => Ok(DispatchMode::Line),
        LineMode::Document => Err(ConvertError::UnsupportedMode {
            mapping: spec.id.clone(),
            reason: format!("the {} hint requires line mode", hints::LAST_UPDATE),
        }),
    }
}

/// `dir/key`, never escaping `dir` through an absolute key.
fn local_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(key.trim_start_matches('/'))
}

fn write_deletion_list(path: &Path, entities: &[String]) -> Result<(), ConvertError> {
    let mut writer = OutputWriter::create(path, true)?;
    for entity in entities {
        writeln!(writer, "{entity}").map_err(|e| ConvertError::io(path, e))?;
    }
    writer.finish().map_err(|e| ConvertError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hint_forces_line_mode() {
        let spec = MappingSpec::new("pubs").with_hint(hints::LAST_UPDATE);
        assert_eq!(dispatch_mode(&spec, "pubs/a.json", true).unwrap(), DispatchMode::Line);
        assert_eq!(dispatch_mode(&spec, "pubs/a.json", false).unwrap(), DispatchMode::Document);
    }

    #[test]
    fn hint_rejects_document_mode() {
        let spec = MappingSpec::new("pubs")
            .with_hint(hints::LAST_UPDATE)
            .with_line_mode(LineMode::Document);
        assert!(matches!(
            dispatch_mode(&spec, "pubs/a.jsonl", true),
            Err(ConvertError::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn absolute_keys_stay_inside_dir() {
        assert_eq!(local_path(Path::new("/tmp/in"), "/a/b.jsonl"), PathBuf::from("/tmp/in/a/b.jsonl"));
        assert_eq!(local_path(Path::new("/tmp/in"), "a/b.jsonl"), PathBuf::from("/tmp/in/a/b.jsonl"));
    }
}
