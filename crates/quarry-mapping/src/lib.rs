//! # quarry-mapping
//!
//! Mapping selection and evaluation for Quarry.
//!
//! - [`MappingRegistry`] loads the mapping configuration document, compiles
//!   each spec, and picks the mapping for a source file.
//! - [`ContextAssigner`] derives the named graph a file's output goes to.
//! - [`MappingEngine`] / [`RecordMapper`] are the seam to the record mapper;
//!   [`RmlEngine`] evaluates the JSON subset of RML.

pub mod context;
pub mod engine;
pub mod error;
pub mod registry;
pub mod rules;
pub mod vocab;

pub use context::{ContextAssigner, DEFAULT_DATASET};
pub use engine::{MappingEngine, RecordMapper, RmlEngine, RmlMapper};
pub use error::MappingError;
pub use registry::{CompiledMapping, MappingRegistry};
