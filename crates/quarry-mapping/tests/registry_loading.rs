//! Loading a mapping configuration document from disk.

use std::path::Path;

use pretty_assertions::assert_eq;
use quarry_mapping::{CompiledMapping, MappingRegistry, RmlEngine};

const RULES: &str = r#"
@prefix rr: <http://www.w3.org/ns/r2rml#> .
@prefix rml: <http://semweb.mmlab.be/ns/rml#> .

<#Map>
    rml:logicalSource [ rml:source "input.json" ; rml:iterator "$" ] ;
    rr:subjectMap [ rr:template "https://example.com/{id}" ] ;
    rr:predicateObjectMap [
        rr:predicate <https://schema.org/name> ;
        rr:objectMap [ rml:reference "name" ]
    ] .
"#;

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn loads_specs_and_selects_by_pattern() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "pubs.ttl", RULES);
    write(dir.path(), "authors.ttl", RULES);
    write(
        dir.path(),
        "mappings.json",
        r#"{"mappings":[
            {"id":"pubs","mappingFiles":["pubs.ttl"],"sourceFileIncludePattern":"pubs/.*\\.jsonl(\\.gz)?",
             "processingHints":["last-update"]},
            {"id":"Authors","mappingFiles":["authors.ttl"],"sourceFileIncludePattern":"authors/.*"}
        ]}"#,
    );

    let registry = MappingRegistry::try_load(&dir.path().join("mappings.json"), &RmlEngine).unwrap();

    assert_eq!(registry.len(), 2);
    let pubs = registry.select_for("pubs/2024/part-1.jsonl.gz").unwrap();
    assert_eq!(pubs.id(), "pubs");
    assert!(pubs.spec().has_hint("last-update"));
    // The rml:source literal was replaced by a stream node.
    assert!(pubs.rules().iter().all(|q| !q.object.to_string().contains("input.json")));
    assert_eq!(
        registry.select_for("authors/a.jsonl").map(CompiledMapping::id),
        Some("Authors")
    );
    assert!(registry.get("authors").is_some());
}

#[test]
fn spec_that_fails_to_compile_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "good.ttl", RULES);
    write(
        dir.path(),
        "mappings.json",
        r#"{"mappings":[
            {"id":"good","mappingFiles":["good.ttl"]},
            {"id":"missing","mappingFiles":["does-not-exist.ttl"]},
            {"id":"badpattern","mappingFiles":["good.ttl"],"sourceFileIncludePattern":"("}
        ]}"#,
    );

    let registry = MappingRegistry::load(&dir.path().join("mappings.json"), &RmlEngine);

    assert_eq!(registry.iter().map(CompiledMapping::id).collect::<Vec<_>>(), vec!["good"]);
}

#[test]
fn unreadable_document_yields_empty_registry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = MappingRegistry::load(&dir.path().join("absent.json"), &RmlEngine);
    assert!(registry.is_empty());

    write(dir.path(), "broken.json", "{ nope");
    let registry = MappingRegistry::load(&dir.path().join("broken.json"), &RmlEngine);
    assert!(registry.is_empty());
}
