//! Compiling merged RML rules into [`RmlMapper`] triples maps.

use std::collections::HashMap;

use oxrdf::{NamedNode, Quad, Subject, Term};

use super::json_path::JsonPath;
use super::rml::{
    ObjectMap, PredicateObjectMap, RmlMapper, SubjectMap, TermKind, TermMap, TermSource,
    TriplesMap,
};
use super::template::Template;
use crate::error::MappingError;
use crate::vocab;

/// Statements grouped by subject, in first-seen order.
#[derive(Default)]
struct RuleIndex {
    order: Vec<Subject>,
    by_subject: HashMap<Subject, Vec<(NamedNode, Term)>>,
}

impl RuleIndex {
    fn new(rules: &[Quad]) -> Self {
        let mut index = Self::default();
        for quad in rules {
            let entry = index.by_subject.entry(quad.subject.clone()).or_insert_with(|| {
                index.order.push(quad.subject.clone());
                Vec::new()
            });
            entry.push((quad.predicate.clone(), quad.object.clone()));
        }
        index
    }

    fn objects<'a>(&'a self, subject: &Subject, predicate: &'a str) -> impl Iterator<Item = &'a Term> + use<'a> {
        self.by_subject
            .get(subject)
            .into_iter()
            .flatten()
            .filter(move |(p, _)| p.as_str() == predicate)
            .map(|(_, o)| o)
    }

    fn object<'a>(&'a self, subject: &Subject, predicate: &'a str) -> Option<&'a Term> {
        self.objects(subject, predicate).next()
    }

    fn has(&self, subject: &Subject, predicate: &str) -> bool {
        self.object(subject, predicate).is_some()
    }
}

fn as_subject(term: &Term) -> Option<Subject> {
    match term {
        Term::NamedNode(node) => Some(Subject::NamedNode(node.clone())),
        Term::BlankNode(node) => Some(Subject::BlankNode(node.clone())),
        _ => None,
    }
}

fn literal_value<'a>(term: &'a Term, what: &str) -> Result<&'a str, MappingError> {
    match term {
        Term::Literal(literal) => Ok(literal.value()),
        other => Err(MappingError::Rules(format!("{what} must be a literal, found {other}"))),
    }
}

fn iri_value<'a>(term: &'a Term, what: &str) -> Result<&'a NamedNode, MappingError> {
    match term {
        Term::NamedNode(node) => Ok(node),
        other => Err(MappingError::Rules(format!("{what} must be an IRI, found {other}"))),
    }
}

const OBJECT_MAP: &str = "object map";

fn describe(subject: &Subject) -> String {
    subject.to_string()
}

struct Compiler<'a> {
    index: &'a RuleIndex,
    positions: HashMap<Subject, usize>,
}

impl Compiler<'_> {
    /// Compile the term map described by node `map`, with `default_kind`
    /// applying when no `rr:termType` is given.
    fn term_map(&self, map: &Subject, role: &str, default_kind: TermKind) -> Result<TermMap, MappingError> {
        let index = self.index;
        let source = if let Some(constant) = index.object(map, vocab::RR_CONSTANT) {
            TermSource::Constant(constant.clone())
        } else if let Some(reference) = index.object(map, vocab::RML_REFERENCE) {
            TermSource::Reference(JsonPath::parse(literal_value(reference, "rml:reference")?)?)
        } else if let Some(template) = index.object(map, vocab::RR_TEMPLATE) {
            TermSource::Template(Template::parse(literal_value(template, "rr:template")?)?)
        } else {
            return Err(MappingError::Rules(format!(
                "{role} {} has no rr:constant, rml:reference or rr:template",
                describe(map)
            )));
        };

        let datatype = index
            .object(map, vocab::RR_DATATYPE)
            .map(|term| iri_value(term, "rr:datatype").cloned())
            .transpose()?;
        let language = index
            .object(map, vocab::RR_LANGUAGE)
            .map(|term| literal_value(term, "rr:language").map(str::to_string))
            .transpose()?;

        let kind = match index.object(map, vocab::RR_TERM_TYPE) {
            Some(term) => match iri_value(term, "rr:termType")?.as_str() {
                vocab::RR_IRI => TermKind::Iri,
                vocab::RR_BLANK_NODE => TermKind::BlankNode,
                vocab::RR_LITERAL => TermKind::Literal,
                other => {
                    return Err(MappingError::Rules(format!("unknown rr:termType {other}")));
                }
            },
            // Object maps default to literals when they read data or carry a
            // datatype or language.
            None if role == OBJECT_MAP
                && (matches!(source, TermSource::Reference(_))
                    || datatype.is_some()
                    || language.is_some()) =>
            {
                TermKind::Literal
            }
            None => default_kind,
        };

        Ok(TermMap {
            source,
            kind,
            datatype,
            language,
        })
    }

    fn constant(term: &Term, kind: TermKind) -> TermMap {
        TermMap {
            source: TermSource::Constant(term.clone()),
            kind,
            datatype: None,
            language: None,
        }
    }

    /// Graph maps attached to `node` via `rr:graphMap` or the `rr:graph` shortcut.
    fn graph_maps(&self, node: &Subject) -> Result<Vec<TermMap>, MappingError> {
        let mut graphs = Vec::new();
        for term in self.index.objects(node, vocab::RR_GRAPH) {
            graphs.push(Self::constant(term, TermKind::Iri));
        }
        for term in self.index.objects(node, vocab::RR_GRAPH_MAP) {
            let map = self.node(term, "rr:graphMap")?;
            graphs.push(self.term_map(&map, "graph map", TermKind::Iri)?);
        }
        Ok(graphs)
    }

    fn node(&self, term: &Term, what: &str) -> Result<Subject, MappingError> {
        as_subject(term).ok_or_else(|| MappingError::Rules(format!("{what} must be a node, found {term}")))
    }

    fn subject_map(&self, triples_map: &Subject) -> Result<SubjectMap, MappingError> {
        let index = self.index;
        if let Some(constant) = index.object(triples_map, vocab::RR_SUBJECT) {
            return Ok(SubjectMap {
                term: Self::constant(constant, TermKind::Iri),
                classes: Vec::new(),
                graphs: Vec::new(),
            });
        }
        let node = index
            .object(triples_map, vocab::RR_SUBJECT_MAP)
            .ok_or_else(|| {
                MappingError::Rules(format!("triples map {} has no subject map", describe(triples_map)))
            })?;
        let node = self.node(node, "rr:subjectMap")?;

        let classes = index
            .objects(&node, vocab::RR_CLASS)
            .map(|term| iri_value(term, "rr:class").cloned())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SubjectMap {
            term: self.term_map(&node, "subject map", TermKind::Iri)?,
            classes,
            graphs: self.graph_maps(&node)?,
        })
    }

    fn object_map(&self, term: &Term) -> Result<ObjectMap, MappingError> {
        let node = self.node(term, "rr:objectMap")?;
        if let Some(parent) = self.index.object(&node, vocab::RR_PARENT_TRIPLES_MAP) {
            let parent = self.node(parent, "rr:parentTriplesMap")?;
            let position = self.positions.get(&parent).ok_or_else(|| {
                MappingError::Rules(format!("unknown parent triples map {}", describe(&parent)))
            })?;
            return Ok(ObjectMap::Parent(*position));
        }
        Ok(ObjectMap::Term(self.term_map(&node, OBJECT_MAP, TermKind::Iri)?))
    }

    fn predicate_object_map(&self, term: &Term) -> Result<PredicateObjectMap, MappingError> {
        let index = self.index;
        let node = self.node(term, "rr:predicateObjectMap")?;

        let mut predicates = Vec::new();
        for predicate in index.objects(&node, vocab::RR_PREDICATE) {
            iri_value(predicate, "rr:predicate")?;
            predicates.push(Self::constant(predicate, TermKind::Iri));
        }
        for map in index.objects(&node, vocab::RR_PREDICATE_MAP) {
            let map = self.node(map, "rr:predicateMap")?;
            predicates.push(self.term_map(&map, "predicate map", TermKind::Iri)?);
        }

        let mut objects = Vec::new();
        for object in index.objects(&node, vocab::RR_OBJECT) {
            objects.push(ObjectMap::Term(Self::constant(object, TermKind::Iri)));
        }
        for map in index.objects(&node, vocab::RR_OBJECT_MAP) {
            objects.push(self.object_map(map)?);
        }

        if predicates.is_empty() || objects.is_empty() {
            return Err(MappingError::Rules(format!(
                "predicate-object map {} needs at least one predicate and one object",
                describe(&node)
            )));
        }

        Ok(PredicateObjectMap {
            predicates,
            objects,
            graphs: self.graph_maps(&node)?,
        })
    }

    fn iterator(&self, triples_map: &Subject) -> Result<JsonPath, MappingError> {
        let index = self.index;
        let Some(source) = index.object(triples_map, vocab::RML_LOGICAL_SOURCE) else {
            return JsonPath::parse("$");
        };
        let source = self.node(source, "rml:logicalSource")?;

        if let Some(formulation) = index.object(&source, vocab::RML_REFERENCE_FORMULATION) {
            if !matches!(formulation, Term::NamedNode(node) if node.as_str() == vocab::QL_JSONPATH) {
                tracing::warn!(
                    triples_map = %describe(triples_map),
                    formulation = %formulation,
                    "unsupported reference formulation, evaluating as JSONPath"
                );
            }
        }

        match index.object(&source, vocab::RML_ITERATOR) {
            Some(iterator) => JsonPath::parse(literal_value(iterator, "rml:iterator")?),
            None => JsonPath::parse("$"),
        }
    }
}

/// Build a mapper from merged rules.
///
/// # Errors
///
/// Returns [`MappingError::Rules`] if no triples map is found or a map is
/// malformed.
pub(super) fn compile(rules: &[Quad]) -> Result<RmlMapper, MappingError> {
    let index = RuleIndex::new(rules);

    let triples_maps: Vec<Subject> = index
        .order
        .iter()
        .filter(|subject| {
            index.has(subject, vocab::RML_LOGICAL_SOURCE)
                || index.has(subject, vocab::RR_SUBJECT_MAP)
                || index.has(subject, vocab::RR_SUBJECT)
        })
        .cloned()
        .collect();
    if triples_maps.is_empty() {
        return Err(MappingError::Rules("no triples maps found".to_string()));
    }

    let compiler = Compiler {
        index: &index,
        positions: triples_maps
            .iter()
            .enumerate()
            .map(|(position, subject)| (subject.clone(), position))
            .collect(),
    };

    let mut maps = Vec::with_capacity(triples_maps.len());
    for triples_map in &triples_maps {
        let predicate_objects = index
            .objects(triples_map, vocab::RR_PREDICATE_OBJECT_MAP)
            .map(|term| compiler.predicate_object_map(term))
            .collect::<Result<Vec<_>, _>>()?;

        maps.push(TriplesMap {
            name: describe(triples_map),
            iterator: compiler.iterator(triples_map)?,
            subject: compiler.subject_map(triples_map)?,
            predicate_objects,
        });
    }

    tracing::debug!(triples_maps = maps.len(), "compiled RML mapping");
    Ok(RmlMapper { maps })
}
