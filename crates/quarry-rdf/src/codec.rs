//! RDF codec: output format resolution, a serializing sink, and parsing.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use oxrdf::Quad;
use oxrdfio::{RdfFormat, RdfParser, RdfSerializer, WriterQuadSerializer};

use crate::error::RdfError;
use crate::sink::StatementSink;

/// Base IRI for relative references in parsed documents.
pub const PARSE_BASE_IRI: &str = "http://base.quarry.invalid/";

/// Resolve a configured output format name.
///
/// Accepts a file extension (`trig`, `.nq`) or a media type
/// (`application/trig`). Unknown names, and formats that cannot carry named
/// graphs, fall back to N-Quads with a warning.
pub fn resolve_output_format(name: &str) -> RdfFormat {
    let trimmed = name.trim().trim_start_matches('.').to_ascii_lowercase();
    let format = RdfFormat::from_extension(&trimmed).or_else(|| RdfFormat::from_media_type(&trimmed));

    match format {
        Some(format) if format.supports_datasets() => format,
        Some(format) => {
            tracing::warn!(
                format = format.name(),
                "output format cannot carry named graphs, using N-Quads"
            );
            RdfFormat::NQuads
        }
        None => {
            tracing::warn!(format = %name, "unknown output format, using N-Quads");
            RdfFormat::NQuads
        }
    }
}

/// Parse a document from a reader.
///
/// Blank node labels are renamed so that documents parsed separately can be
/// merged without clashes.
///
/// # Errors
///
/// Returns [`RdfError::Parse`] on the first syntax error.
pub fn parse_reader<R: Read>(reader: R, format: RdfFormat) -> Result<Vec<Quad>, RdfError> {
    RdfParser::from_format(format)
        .with_base_iri(PARSE_BASE_IRI)?
        .rename_blank_nodes()
        .for_reader(reader)
        .map(|quad| quad.map_err(RdfError::from))
        .collect()
}

/// Format of a mapping-artifact file with extension `ext`.
///
/// Only the usual RDF document extensions are recognized.
#[must_use]
pub fn format_for_extension(ext: &str) -> Option<RdfFormat> {
    match ext.to_ascii_lowercase().as_str() {
        "ttl" => Some(RdfFormat::Turtle),
        "nt" => Some(RdfFormat::NTriples),
        "nq" => Some(RdfFormat::NQuads),
        "trig" => Some(RdfFormat::TriG),
        "rdf" => Some(RdfFormat::RdfXml),
        "n3" => Some(RdfFormat::N3),
        _ => None,
    }
}

/// Parse a file, picking the format from its extension.
///
/// Returns `Ok(None)` when the extension is not one of `ttl`, `nt`, `nq`,
/// `trig`, `rdf` or `n3`.
///
/// # Errors
///
/// Returns [`RdfError::Io`] if the file cannot be opened, or
/// [`RdfError::Parse`] on syntax errors.
pub fn parse_file(path: &Path) -> Result<Option<Vec<Quad>>, RdfError> {
    let Some(format) = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(format_for_extension)
    else {
        return Ok(None);
    };
    let file = File::open(path)?;
    parse_reader(BufReader::new(file), format).map(Some)
}

// ---------------------------------------------------------------------------
// RdfWriterSink
// ---------------------------------------------------------------------------

/// Terminal sink serializing statements to a writer.
pub struct RdfWriterSink<W: Write> {
    format: RdfFormat,
    serializer: Option<WriterQuadSerializer<W>>,
    finished: Option<W>,
    written: u64,
}

impl<W: Write> RdfWriterSink<W> {
    /// Create a sink writing `format` to `writer`, declaring `prefixes`.
    ///
    /// # Errors
    ///
    /// Returns [`RdfError::Iri`] if a prefix IRI is invalid.
    pub fn new(
        format: RdfFormat,
        prefixes: &BTreeMap<String, String>,
        writer: W,
    ) -> Result<Self, RdfError> {
        let mut serializer = RdfSerializer::from_format(format);
        for (prefix, iri) in prefixes {
            serializer = serializer.with_prefix(prefix.as_str(), iri.as_str())?;
        }
        Ok(Self {
            format,
            serializer: Some(serializer.for_writer(writer)),
            finished: None,
            written: 0,
        })
    }

    pub const fn format(&self) -> RdfFormat {
        self.format
    }

    /// Statements serialized so far.
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// The underlying writer, available once the stream has ended.
    pub fn into_inner(self) -> Option<W> {
        self.finished
    }
}

impl<W: Write> StatementSink for RdfWriterSink<W> {
    fn handle(&mut self, quad: Quad) -> Result<(), RdfError> {
        let serializer = self.serializer.as_mut().ok_or(RdfError::Closed)?;
        serializer.serialize_quad(&quad)?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> Result<(), RdfError> {
        if let Some(serializer) = self.serializer.take() {
            let mut writer = serializer.finish()?;
            writer.flush()?;
            self.finished = Some(writer);
        }
        Ok(())
    }
}
