//! The record-mapping seam.
//!
//! A [`MappingEngine`] turns merged mapping rules into a [`RecordMapper`];
//! the mapper turns one record (raw bytes) into statements. [`RmlEngine`] is
//! the built-in engine for the JSON subset of RML.

mod compile;
pub mod json_path;
mod rml;
pub mod template;

use std::fmt;
use std::sync::Arc;

use oxrdf::Quad;
use quarry_rdf::LiteralContext;

use crate::error::MappingError;

pub use rml::RmlMapper;

/// Evaluates a compiled mapping against one record.
pub trait RecordMapper: Send + Sync + fmt::Debug {
    /// Map `input` to statements. Typed literals go through `literals`.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] if the record is malformed or a literal is
    /// rejected by the policy.
    fn map_record(
        &self,
        input: &[u8],
        literals: &LiteralContext<'_>,
    ) -> Result<Vec<Quad>, MappingError>;
}

/// Compiles mapping rules into an executable mapper.
pub trait MappingEngine: Send + Sync {
    /// # Errors
    ///
    /// Returns [`MappingError::Rules`] if the rules cannot be compiled.
    fn compile(&self, rules: &[Quad]) -> Result<Arc<dyn RecordMapper>, MappingError>;
}

/// Built-in engine for RML over JSON records.
#[derive(Debug, Default, Clone, Copy)]
pub struct RmlEngine;

impl MappingEngine for RmlEngine {
    fn compile(&self, rules: &[Quad]) -> Result<Arc<dyn RecordMapper>, MappingError> {
        Ok(Arc::new(compile::compile(rules)?))
    }
}
