//! Loading and preparing mapping rules.
//!
//! All rule files of a spec are parsed and merged into one model. Records
//! arrive as in-process byte streams, so every `rml:source` is rewritten to
//! point at a stream source instead of a file.

use std::path::{Path, PathBuf};

use oxrdf::vocab::rdf;
use oxrdf::{BlankNode, NamedNode, Quad, Subject, Term};
use quarry_rdf::parse_file;

use crate::error::MappingError;
use crate::vocab;

/// Resolve `file` against the directory holding the mapping configuration.
pub fn resolve_rule_path(config_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_dir.join(path)
    }
}

/// Parse and merge rule files.
///
/// Files with an unknown extension are skipped with a warning.
///
/// # Errors
///
/// Returns [`MappingError::Rdf`] if a file cannot be read or parsed.
pub fn load_rules(config_dir: &Path, files: &[String]) -> Result<Vec<Quad>, MappingError> {
    let mut merged = Vec::new();
    for file in files {
        let path = resolve_rule_path(config_dir, file);
        match parse_file(&path)? {
            Some(quads) => {
                tracing::debug!(path = %path.display(), statements = quads.len(), "loaded mapping rules");
                merged.extend(quads);
            }
            None => {
                tracing::warn!(path = %path.display(), "skipping mapping file with unknown RDF format");
            }
        }
    }
    Ok(merged)
}

/// Replace the object of every `rml:source` statement with a fresh blank
/// node typed as a stream source.
pub fn substitute_stream_sources(rules: Vec<Quad>) -> Vec<Quad> {
    let source = NamedNode::new_unchecked(vocab::RML_SOURCE);
    let stream = NamedNode::new_unchecked(vocab::CARML_STREAM);

    let mut out = Vec::with_capacity(rules.len());
    for quad in rules {
        if quad.predicate != source {
            out.push(quad);
            continue;
        }
        let node = BlankNode::default();
        out.push(Quad::new(
            quad.subject,
            quad.predicate,
            Term::BlankNode(node.clone()),
            quad.graph_name.clone(),
        ));
        out.push(Quad::new(
            Subject::BlankNode(node),
            rdf::TYPE.into_owned(),
            Term::NamedNode(stream.clone()),
            quad.graph_name,
        ));
    }
    out
}
