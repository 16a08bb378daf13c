//! # quarry-rdf
//!
//! RDF plumbing for Quarry.
//!
//! - [`StatementSink`]: the push-style seam every producer writes into
//! - [`FixedContextSink`] and [`BatchingSink`]: decorators composing the
//!   per-file output pipeline `BatchingSink(FixedContextSink(RdfWriterSink))`
//! - [`RdfWriterSink`], [`parse_file`], [`resolve_output_format`]: the codec,
//!   backed by `oxrdfio`
//! - [`LiteralPolicy`]: what happens when a typed literal fails validation

pub mod batching;
pub mod codec;
pub mod error;
pub mod fixed_context;
pub mod literal;
pub mod sink;

pub use batching::BatchingSink;
pub use codec::{RdfWriterSink, parse_file, parse_reader, resolve_output_format};
pub use error::RdfError;
pub use fixed_context::FixedContextSink;
pub use literal::{LiteralContext, LiteralConversionMode, LiteralPolicy};
pub use sink::{CollectingSink, StatementSink};

pub use oxrdf;
pub use oxrdfio::RdfFormat;
