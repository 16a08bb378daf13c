//! The per-file output pipeline: BatchingSink(FixedContextSink(RdfWriterSink)).

use std::collections::BTreeMap;

use oxrdf::{GraphName, Literal, NamedNode, Quad};
use pretty_assertions::assert_eq;
use quarry_rdf::{
    BatchingSink, FixedContextSink, RdfFormat, RdfWriterSink, StatementSink, parse_reader,
};

fn node(iri: &str) -> NamedNode {
    NamedNode::new(iri).unwrap()
}

fn statement(n: usize, graph: GraphName) -> Quad {
    Quad::new(
        node(&format!("https://example.com/record/{n}")),
        node("https://schema.org/name"),
        Literal::new_simple_literal(format!("record {n}")),
        graph,
    )
}

#[test]
fn every_written_statement_has_exactly_one_context() {
    let context = node("https://example.com/pubs/");
    let explicit = GraphName::NamedNode(node("https://example.com/explicit"));

    let writer = RdfWriterSink::new(RdfFormat::NQuads, &BTreeMap::new(), Vec::new()).unwrap();
    let mut pipeline = BatchingSink::new(FixedContextSink::new(writer, context.clone()), 4);

    pipeline.start().unwrap();
    for n in 0..10 {
        let graph = if n == 3 {
            explicit.clone()
        } else {
            GraphName::DefaultGraph
        };
        pipeline.handle(statement(n, graph)).unwrap();
    }
    pipeline.end().unwrap();

    let writer = pipeline.into_inner().into_inner();
    assert_eq!(writer.written(), 10);
    let bytes = writer.into_inner().unwrap();

    let parsed = parse_reader(bytes.as_slice(), RdfFormat::NQuads).unwrap();
    assert_eq!(parsed.len(), 10);
    for (n, quad) in parsed.iter().enumerate() {
        let expected = if n == 3 {
            explicit.clone()
        } else {
            GraphName::NamedNode(context.clone())
        };
        assert_eq!(quad.graph_name, expected, "statement {n}");
    }
}

#[test]
fn trig_output_groups_by_graph() {
    let context = node("https://example.com/authors/");
    let mut prefixes = BTreeMap::new();
    prefixes.insert("schema".to_string(), "https://schema.org/".to_string());

    let writer = RdfWriterSink::new(RdfFormat::TriG, &prefixes, Vec::new()).unwrap();
    let mut pipeline = BatchingSink::new(FixedContextSink::new(writer, context), 2);
    pipeline.start().unwrap();
    for n in 0..3 {
        pipeline.handle(statement(n, GraphName::DefaultGraph)).unwrap();
    }
    pipeline.end().unwrap();

    let bytes = pipeline.into_inner().into_inner().into_inner().unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("https://example.com/authors/"));
    assert!(text.contains("schema:"));
}
