//! End-to-end evaluation of RML rules loaded from Turtle.

use std::path::Path;

use oxrdf::vocab::{rdf, xsd};
use oxrdf::{GraphName, Literal, NamedNode, Quad, Term};
use pretty_assertions::assert_eq;
use quarry_core::JobLog;
use quarry_mapping::rules::{load_rules, substitute_stream_sources};
use quarry_mapping::{MappingEngine, MappingError, RecordMapper, RmlEngine};
use quarry_rdf::{LiteralContext, LiteralConversionMode, LiteralPolicy};

const PUBS_RULES: &str = r#"
@prefix rr: <http://www.w3.org/ns/r2rml#> .
@prefix rml: <http://semweb.mmlab.be/ns/rml#> .
@prefix ql: <http://semweb.mmlab.be/ns/ql#> .
@prefix schema: <https://schema.org/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

<#Publication>
    rml:logicalSource [
        rml:source "pubs.jsonl" ;
        rml:referenceFormulation ql:JSONPath ;
        rml:iterator "$"
    ] ;
    rr:subjectMap [
        rr:template "https://example.com/pub/{id}" ;
        rr:class schema:ScholarlyArticle
    ] ;
    rr:predicateObjectMap [
        rr:predicate schema:name ;
        rr:objectMap [ rml:reference "title" ]
    ] ;
    rr:predicateObjectMap [
        rr:predicate schema:datePublished ;
        rr:objectMap [ rml:reference "year" ; rr:datatype xsd:gYear ]
    ] ;
    rr:predicateObjectMap [
        rr:predicate schema:pageCount ;
        rr:objectMap [ rml:reference "pages" ; rr:datatype xsd:int ]
    ] ;
    rr:predicateObjectMap [
        rr:predicate schema:keywords ;
        rr:objectMap [ rml:reference "keywords[*]" ]
    ] ;
    rr:predicateObjectMap [
        rr:predicate schema:author ;
        rr:objectMap [ rr:parentTriplesMap <#Author> ]
    ] .

<#Author>
    rml:logicalSource [
        rml:source "pubs.jsonl" ;
        rml:referenceFormulation ql:JSONPath ;
        rml:iterator "$.authors[*]"
    ] ;
    rr:subjectMap [ rr:template "https://example.com/person/{orcid}" ] ;
    rr:predicateObjectMap [
        rr:predicate schema:name ;
        rr:objectMap [ rml:reference "name" ; rr:language "en" ]
    ] .
"#;

fn node(iri: &str) -> NamedNode {
    NamedNode::new(iri).unwrap()
}

fn compile(dir: &Path) -> std::sync::Arc<dyn RecordMapper> {
    std::fs::write(dir.join("pubs.ttl"), PUBS_RULES).unwrap();
    let rules = substitute_stream_sources(load_rules(dir, &["pubs.ttl".to_string()]).unwrap());
    RmlEngine.compile(&rules).unwrap()
}

fn map(
    mapper: &dyn RecordMapper,
    mode: LiteralConversionMode,
    record: &str,
) -> (Result<Vec<Quad>, MappingError>, JobLog) {
    let policy = LiteralPolicy::new(mode);
    let log = JobLog::new("job-1");
    let result = mapper.map_record(record.as_bytes(), &LiteralContext::new(&policy, &log));
    (result, log)
}

fn has(quads: &[Quad], subject: &str, predicate: &str, object: impl Into<Term>) -> bool {
    let object = object.into();
    quads.iter().any(|q| {
        q.subject.to_string() == format!("<{subject}>")
            && q.predicate.as_str() == predicate
            && q.object == object
            && q.graph_name == GraphName::DefaultGraph
    })
}

#[test]
fn maps_record_with_nested_authors() {
    let dir = tempfile::tempdir().unwrap();
    let mapper = compile(dir.path());
    let record = r#"{"id":"p1","title":"On Rust","year":"2021","pages":12,
        "keywords":["systems","safety"],
        "authors":[{"orcid":"0000-1","name":"Ada"},{"orcid":"0000-2","name":"Grace"}]}"#;

    let (result, log) = map(mapper.as_ref(), LiteralConversionMode::default(), record);
    let quads = result.unwrap();
    let pub1 = "https://example.com/pub/p1";

    assert!(has(&quads, pub1, rdf::TYPE.as_str(), node("https://schema.org/ScholarlyArticle")));
    assert!(has(&quads, pub1, "https://schema.org/name", Literal::new_simple_literal("On Rust")));
    assert!(has(
        &quads,
        pub1,
        "https://schema.org/pageCount",
        Literal::new_typed_literal("12", xsd::INT)
    ));
    assert!(has(&quads, pub1, "https://schema.org/keywords", Literal::new_simple_literal("safety")));
    assert!(has(
        &quads,
        "https://example.com/person/0000-1",
        "https://schema.org/name",
        Literal::new_language_tagged_literal_unchecked("Ada", "en")
    ));
    // The parent join only sees the root item, which has no orcid.
    assert!(!quads.iter().any(|q| q.predicate.as_str() == "https://schema.org/author"));
    assert_eq!(log.entries().len(), 0);
}

#[test]
fn invalid_literal_becomes_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let mapper = compile(dir.path());
    let record = r#"{"id":"p2","title":"Broken","pages":"12a"}"#;

    let (result, log) = map(mapper.as_ref(), LiteralConversionMode::default(), record);
    let quads = result.unwrap();

    assert!(has(
        &quads,
        "https://example.com/pub/p2",
        "https://schema.org/pageCount",
        Literal::new_typed_literal("0", xsd::INT)
    ));
    assert_eq!(log.entries().len(), 1);
    assert!(log.entries()[0].message.contains("12a"));
}

#[test]
fn invalid_literal_fails_record_in_strict_mode() {
    let dir = tempfile::tempdir().unwrap();
    let mapper = compile(dir.path());
    let record = r#"{"id":"p3","pages":"many"}"#;

    let (result, _) = map(mapper.as_ref(), LiteralConversionMode::ValidateAndFail, record);
    assert!(matches!(result, Err(MappingError::Rdf(_))));
}

#[test]
fn malformed_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mapper = compile(dir.path());

    let (result, _) = map(mapper.as_ref(), LiteralConversionMode::default(), "{not json");
    assert!(matches!(result, Err(MappingError::Json(_))));
}

#[test]
fn missing_subject_value_produces_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mapper = compile(dir.path());

    let (result, _) = map(mapper.as_ref(), LiteralConversionMode::default(), r#"{"title":"x"}"#);
    assert_eq!(result.unwrap(), Vec::<Quad>::new());
}

#[test]
fn rules_without_triples_maps_do_not_compile() {
    let result = RmlEngine.compile(&[]);
    assert!(matches!(result, Err(MappingError::Rules(_))));
}
