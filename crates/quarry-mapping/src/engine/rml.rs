//! Compiled RML triples maps and their evaluation over JSON records.

use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
use quarry_rdf::LiteralContext;
use serde_json::Value;

use super::RecordMapper;
use super::json_path::{JsonPath, Scalar};
use super::template::Template;
use crate::error::MappingError;
use crate::vocab;

#[derive(Debug, Clone)]
pub(super) enum TermSource {
    Constant(Term),
    Reference(JsonPath),
    Template(Template),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TermKind {
    Iri,
    BlankNode,
    Literal,
}

#[derive(Debug, Clone)]
pub(super) struct TermMap {
    pub source: TermSource,
    pub kind: TermKind,
    pub datatype: Option<NamedNode>,
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub(super) enum ObjectMap {
    Term(TermMap),
    /// Subject of another triples map, evaluated on the same item.
    Parent(usize),
}

#[derive(Debug, Clone)]
pub(super) struct SubjectMap {
    pub term: TermMap,
    pub classes: Vec<NamedNode>,
    pub graphs: Vec<TermMap>,
}

#[derive(Debug, Clone)]
pub(super) struct PredicateObjectMap {
    pub predicates: Vec<TermMap>,
    pub objects: Vec<ObjectMap>,
    pub graphs: Vec<TermMap>,
}

#[derive(Debug, Clone)]
pub(super) struct TriplesMap {
    pub name: String,
    pub iterator: JsonPath,
    pub subject: SubjectMap,
    pub predicate_objects: Vec<PredicateObjectMap>,
}

/// Mapper produced by [`super::RmlEngine`].
#[derive(Debug, Clone)]
pub struct RmlMapper {
    pub(super) maps: Vec<TriplesMap>,
}

impl RmlMapper {
    /// Names of the compiled triples maps, in evaluation order.
    pub fn triples_maps(&self) -> impl Iterator<Item = &str> {
        self.maps.iter().map(|map| map.name.as_str())
    }
}

/// Per-record evaluation state.
struct Evaluation<'a, 'b> {
    literals: &'a LiteralContext<'b>,
    /// Keeps blank node labels of different records apart.
    blank_prefix: String,
}

impl Evaluation<'_, '_> {
    fn terms(&self, map: &TermMap, item: &Value) -> Result<Vec<Term>, MappingError> {
        match &map.source {
            TermSource::Constant(term) => Ok(vec![term.clone()]),
            TermSource::Reference(path) => path
                .values(item)
                .into_iter()
                .map(|scalar| self.term_from_scalar(map, scalar))
                .collect(),
            TermSource::Template(template) => template
                .expand(item, map.kind == TermKind::Iri)
                .into_iter()
                .map(|text| self.term_from_scalar(map, Scalar::String(text)))
                .collect(),
        }
    }

    fn term_from_scalar(&self, map: &TermMap, scalar: Scalar) -> Result<Term, MappingError> {
        match map.kind {
            TermKind::Iri => {
                let lexical = scalar.lexical();
                NamedNode::new(&lexical)
                    .map(Term::NamedNode)
                    .map_err(|error| MappingError::Record(format!("invalid IRI '{lexical}': {error}")))
            }
            TermKind::BlankNode => Ok(Term::BlankNode(self.blank_node(&scalar.lexical()))),
            TermKind::Literal => self.literal(map, scalar).map(Term::Literal),
        }
    }

    fn literal(&self, map: &TermMap, scalar: Scalar) -> Result<Literal, MappingError> {
        if let Some(language) = &map.language {
            return Ok(self.literals.language(&scalar.lexical(), language)?);
        }
        if let Some(datatype) = &map.datatype {
            return Ok(self.literals.typed(&scalar.lexical(), datatype.as_ref())?);
        }
        Ok(match scalar {
            Scalar::String(text) => Literal::new_simple_literal(text),
            Scalar::Integer(text) => self.literals.typed(&text, xsd::INTEGER)?,
            Scalar::Double(text) => self.literals.typed(&text, xsd::DOUBLE)?,
            Scalar::Boolean(flag) => Literal::from(flag),
        })
    }

    fn blank_node(&self, value: &str) -> BlankNode {
        let label: String = value
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        BlankNode::new(format!("{}{label}", self.blank_prefix)).unwrap_or_default()
    }

    fn subjects(&self, map: &TermMap, item: &Value) -> Result<Vec<Subject>, MappingError> {
        self.terms(map, item)?
            .into_iter()
            .map(|term| match term {
                Term::NamedNode(node) => Ok(Subject::NamedNode(node)),
                Term::BlankNode(node) => Ok(Subject::BlankNode(node)),
                other => Err(MappingError::Record(format!(
                    "subject map produced a non-resource term: {other}"
                ))),
            })
            .collect()
    }

    fn predicates(&self, map: &TermMap, item: &Value) -> Result<Vec<NamedNode>, MappingError> {
        self.terms(map, item)?
            .into_iter()
            .map(|term| match term {
                Term::NamedNode(node) => Ok(node),
                other => Err(MappingError::Record(format!(
                    "predicate map produced a non-IRI term: {other}"
                ))),
            })
            .collect()
    }

    fn graphs(&self, maps: &[TermMap], item: &Value) -> Result<Vec<GraphName>, MappingError> {
        let mut graphs = Vec::new();
        for map in maps {
            for term in self.terms(map, item)? {
                let graph = match term {
                    Term::NamedNode(node) if node.as_str() == vocab::RR_DEFAULT_GRAPH => {
                        GraphName::DefaultGraph
                    }
                    Term::NamedNode(node) => GraphName::NamedNode(node),
                    Term::BlankNode(node) => GraphName::BlankNode(node),
                    other => {
                        return Err(MappingError::Record(format!(
                            "graph map produced a literal: {other}"
                        )));
                    }
                };
                if !graphs.contains(&graph) {
                    graphs.push(graph);
                }
            }
        }
        Ok(graphs)
    }
}

fn emit(out: &mut Vec<Quad>, subject: &Subject, predicate: &NamedNode, object: &Term, graphs: &[GraphName]) {
    if graphs.is_empty() {
        out.push(Quad::new(
            subject.clone(),
            predicate.clone(),
            object.clone(),
            GraphName::DefaultGraph,
        ));
        return;
    }
    for graph in graphs {
        out.push(Quad::new(
            subject.clone(),
            predicate.clone(),
            object.clone(),
            graph.clone(),
        ));
    }
}

impl RecordMapper for RmlMapper {
    fn map_record(
        &self,
        input: &[u8],
        literals: &LiteralContext<'_>,
    ) -> Result<Vec<Quad>, MappingError> {
        let root: Value = serde_json::from_slice(input)?;
        let evaluation = Evaluation {
            literals,
            blank_prefix: format!("{}_", BlankNode::default().as_str()),
        };
        let rdf_type = rdf::TYPE.into_owned();

        let mut out = Vec::new();
        for map in &self.maps {
            for item in map.iterator.select(&root) {
                let subjects = evaluation.subjects(&map.subject.term, item)?;
                if subjects.is_empty() {
                    continue;
                }
                let subject_graphs = evaluation.graphs(&map.subject.graphs, item)?;

                for subject in &subjects {
                    for class in &map.subject.classes {
                        let class = Term::NamedNode(class.clone());
                        emit(&mut out, subject, &rdf_type, &class, &subject_graphs);
                    }

                    for pom in &map.predicate_objects {
                        let mut graphs = subject_graphs.clone();
                        for graph in evaluation.graphs(&pom.graphs, item)? {
                            if !graphs.contains(&graph) {
                                graphs.push(graph);
                            }
                        }

                        let mut predicates = Vec::new();
                        for predicate in &pom.predicates {
                            predicates.extend(evaluation.predicates(predicate, item)?);
                        }

                        let mut objects = Vec::new();
                        for object in &pom.objects {
                            match object {
                                ObjectMap::Term(term) => objects.extend(evaluation.terms(term, item)?),
                                ObjectMap::Parent(index) => {
                                    let parent = &self.maps[*index].subject.term;
                                    objects.extend(
                                        evaluation
                                            .subjects(parent, item)?
                                            .into_iter()
                                            .map(Term::from),
                                    );
                                }
                            }
                        }

                        for predicate in &predicates {
                            for object in &objects {
                                emit(&mut out, subject, predicate, object, &graphs);
                            }
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}
