//! # quarry-convert
//!
//! The per-file conversion pipeline and the batch worker around it.
//!
//! A [`BatchWorker`] takes a batch request and hands each task to the
//! [`FileConversionOrchestrator`], which selects the mapping, derives the
//! target context, fetches the source, and runs the [`RecordDispatcher`]
//! into `BatchingSink(FixedContextSink(writer))`. Records of mappings with
//! the `last-update` hint are reconciled on the way.

pub mod dispatcher;
pub mod error;
pub mod naming;
pub mod orchestrator;
pub mod preprocess;
pub mod stats;
pub mod worker;

pub use dispatcher::{DispatchMode, DispatchReport, Reconciliation, RecordDispatcher};
pub use error::ConvertError;
pub use orchestrator::{FileConversionOrchestrator, FileReport};
pub use preprocess::{Preprocessor, RecordFacts};
pub use stats::ConversionStats;
pub use worker::BatchWorker;
