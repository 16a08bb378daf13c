//! # quarry-core
//!
//! Core types and error types for Quarry.
//!
//! This crate provides the foundational types shared across all Quarry crates:
//! - Mapping specifications as read from the mapping configuration document
//! - The batch job request/response envelope
//! - Per-record outcomes used for counters and failure reporting
//! - The job-scoped log sink passed explicitly through the pipeline
//! - Cross-cutting error types

pub mod batch;
pub mod errors;
pub mod job_log;
pub mod mapping_spec;
pub mod outcome;

pub use batch::{BatchRequest, BatchResponse, BatchTask, ResultCode, TaskResult};
pub use errors::CoreError;
pub use job_log::{JobLog, JobLogEntry, JobLogLevel};
pub use mapping_spec::{LineMode, MappingConfig, MappingSpec, hints};
pub use outcome::RecordOutcome;
