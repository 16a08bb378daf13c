//! Mapping vocabulary IRIs (R2RML, RML, and the stream source marker).

/// R2RML namespace.
pub const RR: &str = "http://www.w3.org/ns/r2rml#";
/// RML namespace.
pub const RML: &str = "http://semweb.mmlab.be/ns/rml#";
/// Query-language namespace used by `rml:referenceFormulation`.
pub const QL: &str = "http://semweb.mmlab.be/ns/ql#";
/// Namespace of the in-memory stream source class.
pub const CARML: &str = "http://carml.taxonic.com/carml/";

pub const RML_LOGICAL_SOURCE: &str = "http://semweb.mmlab.be/ns/rml#logicalSource";
pub const RML_SOURCE: &str = "http://semweb.mmlab.be/ns/rml#source";
pub const RML_ITERATOR: &str = "http://semweb.mmlab.be/ns/rml#iterator";
pub const RML_REFERENCE: &str = "http://semweb.mmlab.be/ns/rml#reference";
pub const RML_REFERENCE_FORMULATION: &str = "http://semweb.mmlab.be/ns/rml#referenceFormulation";
pub const QL_JSONPATH: &str = "http://semweb.mmlab.be/ns/ql#JSONPath";
pub const CARML_STREAM: &str = "http://carml.taxonic.com/carml/Stream";

pub const RR_SUBJECT_MAP: &str = "http://www.w3.org/ns/r2rml#subjectMap";
pub const RR_SUBJECT: &str = "http://www.w3.org/ns/r2rml#subject";
pub const RR_PREDICATE_OBJECT_MAP: &str = "http://www.w3.org/ns/r2rml#predicateObjectMap";
pub const RR_PREDICATE_MAP: &str = "http://www.w3.org/ns/r2rml#predicateMap";
pub const RR_PREDICATE: &str = "http://www.w3.org/ns/r2rml#predicate";
pub const RR_OBJECT_MAP: &str = "http://www.w3.org/ns/r2rml#objectMap";
pub const RR_OBJECT: &str = "http://www.w3.org/ns/r2rml#object";
pub const RR_GRAPH_MAP: &str = "http://www.w3.org/ns/r2rml#graphMap";
pub const RR_GRAPH: &str = "http://www.w3.org/ns/r2rml#graph";
pub const RR_DEFAULT_GRAPH: &str = "http://www.w3.org/ns/r2rml#defaultGraph";
pub const RR_CLASS: &str = "http://www.w3.org/ns/r2rml#class";
pub const RR_TEMPLATE: &str = "http://www.w3.org/ns/r2rml#template";
pub const RR_CONSTANT: &str = "http://www.w3.org/ns/r2rml#constant";
pub const RR_TERM_TYPE: &str = "http://www.w3.org/ns/r2rml#termType";
pub const RR_DATATYPE: &str = "http://www.w3.org/ns/r2rml#datatype";
pub const RR_LANGUAGE: &str = "http://www.w3.org/ns/r2rml#language";
pub const RR_PARENT_TRIPLES_MAP: &str = "http://www.w3.org/ns/r2rml#parentTriplesMap";
pub const RR_IRI: &str = "http://www.w3.org/ns/r2rml#IRI";
pub const RR_BLANK_NODE: &str = "http://www.w3.org/ns/r2rml#BlankNode";
pub const RR_LITERAL: &str = "http://www.w3.org/ns/r2rml#Literal";
