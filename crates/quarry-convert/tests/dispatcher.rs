//! Line and document dispatch, failure isolation, and reconciliation.

use std::io::Cursor;

use oxrdf::{GraphName, Literal, NamedNode, Quad};
use pretty_assertions::assert_eq;
use quarry_convert::dispatcher::compile_skip_pattern;
use quarry_convert::{ConvertError, DispatchMode, Reconciliation, RecordDispatcher};
use quarry_core::{JobLog, JobLogLevel, LineMode};
use quarry_mapping::{MappingError, RecordMapper};
use quarry_rdf::{CollectingSink, LiteralContext, LiteralPolicy};
use quarry_reconcile::{CoordinationStore, RunMode, UpdateResolver, VersionMarker};
use serde_json::Value;

/// Maps `{"id", "name", "status"?, "fail"?}` to a name statement plus an
/// optional status statement; `"fail": true` is a mapping error.
#[derive(Debug)]
struct TestMapper;

impl RecordMapper for TestMapper {
    fn map_record(
        &self,
        input: &[u8],
        _literals: &LiteralContext<'_>,
    ) -> Result<Vec<Quad>, MappingError> {
        let record: Value = serde_json::from_slice(input)?;
        if record["fail"] == Value::Bool(true) {
            return Err(MappingError::Record("boom".to_string()));
        }
        let subject = NamedNode::new(format!(
            "https://example.com/r/{}",
            record["name"].as_str().unwrap_or("anon")
        ))
        .unwrap();
        let mut quads = vec![Quad::new(
            subject.clone(),
            NamedNode::new("https://schema.org/name").unwrap(),
            Literal::new_simple_literal(record["name"].as_str().unwrap_or_default()),
            GraphName::DefaultGraph,
        )];
        if let Some(status) = record["status"].as_str() {
            quads.push(Quad::new(
                subject,
                NamedNode::new("urn:recordStatus").unwrap(),
                Literal::new_simple_literal(status),
                GraphName::DefaultGraph,
            ));
        }
        Ok(quads)
    }
}

fn policy() -> LiteralPolicy {
    LiteralPolicy::default()
}

#[tokio::test]
async fn failing_lines_are_isolated() {
    let input = [
        r#"{"id":1,"name":"a"}"#,
        r#"{"id":2,"fail":true}"#,
        r#"{"id":3,"name":"c"}"#,
        r#"{"id":4,"fail":true}"#,
        r#"{"id":5,"name":"e"}"#,
    ]
    .join("\n");
    let (policy, log) = (policy(), JobLog::new("job"));
    let dispatcher = RecordDispatcher::new(&TestMapper, LiteralContext::new(&policy, &log));
    let mut sink = CollectingSink::new();

    let report = dispatcher
        .dispatch(DispatchMode::Line, Cursor::new(input), &mut sink)
        .await
        .unwrap();

    assert_eq!(report.successes, 3);
    assert_eq!(report.failures, 2);
    assert_eq!(report.written, 3);
    assert!(!report.escalates());
    assert_eq!(log.count(JobLogLevel::Error), 2);
    let messages: Vec<String> = log.entries().into_iter().map(|e| e.message).collect();
    assert!(messages[0].contains("line 2"));
    assert!(messages[1].contains("line 4") && messages[1].contains(r#""fail":true"#));
    assert_eq!(sink.quads.len(), 3);
}

#[tokio::test]
async fn invalid_json_line_is_a_record_failure() {
    let (policy, log) = (policy(), JobLog::new("job"));
    let dispatcher = RecordDispatcher::new(&TestMapper, LiteralContext::new(&policy, &log));
    let mut sink = CollectingSink::new();

    let report = dispatcher
        .dispatch_lines(Cursor::new("not json\n{\"name\":\"ok\"}\n"), &mut sink)
        .await
        .unwrap();

    assert_eq!((report.successes, report.failures), (1, 1));
}

#[tokio::test]
async fn non_utf8_line_is_a_record_failure() {
    let (policy, log) = (policy(), JobLog::new("job"));
    let dispatcher = RecordDispatcher::new(&TestMapper, LiteralContext::new(&policy, &log));
    let mut sink = CollectingSink::new();
    let mut input = b"{\"name\":\"a\"}\r\n".to_vec();
    input.extend_from_slice(b"{\"name\":\"\xff\"}\n");
    input.extend_from_slice(b"{\"name\":\"c\"}");

    let report = dispatcher
        .dispatch_lines(Cursor::new(input), &mut sink)
        .await
        .unwrap();

    assert_eq!((report.successes, report.failures), (2, 1));
    assert_eq!(sink.quads.len(), 2);
    let errors: Vec<String> = log.entries().into_iter().map(|e| e.message).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("line 2") && errors[0].contains("invalid UTF-8"));
}

#[tokio::test]
async fn all_failed_without_output_is_not_escalated() {
    let (policy, log) = (policy(), JobLog::new("job"));
    let dispatcher = RecordDispatcher::new(&TestMapper, LiteralContext::new(&policy, &log));

    let report = dispatcher
        .dispatch_lines(Cursor::new("{\"fail\":true}\n{\"fail\":true}\n"), &mut CollectingSink::new())
        .await
        .unwrap();

    assert_eq!(report.failures, 2);
    assert_eq!(report.produced, 0);
    assert!(!report.escalates());
}

#[tokio::test]
async fn all_failed_with_output_is_escalated() {
    let resolver = UpdateResolver::new(
        CoordinationStore::in_memory().await.unwrap(),
        RunMode::Incremental,
        "bucket",
    );
    let (policy, log) = (policy(), JobLog::new("job"));
    let dispatcher = RecordDispatcher::new(&TestMapper, LiteralContext::new(&policy, &log))
        .with_reconciliation(Some(Reconciliation {
            resolver: &resolver,
            dataset_iri: "",
            kind: "pubs",
            marker: VersionMarker::from("001"),
        }));
    let mut sink = CollectingSink::new();

    // Every record maps, then fails for lack of an id.
    let report = dispatcher
        .dispatch_lines(Cursor::new("{\"name\":\"a\"}\n{\"name\":\"b\"}\n"), &mut sink)
        .await
        .unwrap();

    assert_eq!(report.successes, 0);
    assert_eq!(report.failures, 2);
    assert_eq!(report.produced, 2);
    assert!(report.escalates());
    assert!(sink.quads.is_empty());
}

#[tokio::test]
async fn line_limit_and_skips() {
    let input = "{\"name\":\"a\"}\n\n{\"name\":\"REDIRECT\"}\n{\"name\":\"d\"}\n{\"name\":\"e\"}\n";
    let skip = compile_skip_pattern(Some(".*REDIRECT.*")).unwrap();
    let (policy, log) = (policy(), JobLog::new("job"));
    let dispatcher = RecordDispatcher::new(&TestMapper, LiteralContext::new(&policy, &log))
        .with_skip_pattern(Some(&skip))
        .with_line_limit(Some(4));
    let mut sink = CollectingSink::new();

    let report = dispatcher.dispatch_lines(Cursor::new(input), &mut sink).await.unwrap();

    assert_eq!(report.skipped, 2);
    assert_eq!(report.successes, 2);
    assert!(report.truncated);
    assert_eq!(log.count(JobLogLevel::Error), 0);
}

#[test]
fn skip_pattern_must_match_whole_line() {
    let skip = compile_skip_pattern(Some("REDIRECT")).unwrap();
    assert!(skip.is_match("REDIRECT"));
    assert!(!skip.is_match("{\"name\":\"REDIRECT\"}"));
    assert!(compile_skip_pattern(Some("(")).is_none());
    assert!(compile_skip_pattern(None).is_none());
}

#[tokio::test]
async fn document_mode_maps_once_and_aborts_on_error() {
    let (policy, log) = (policy(), JobLog::new("job"));
    let dispatcher = RecordDispatcher::new(&TestMapper, LiteralContext::new(&policy, &log));

    let mut sink = CollectingSink::new();
    let report = dispatcher
        .dispatch(DispatchMode::Document, Cursor::new("{\n\"name\": \"doc\"\n}"), &mut sink)
        .await
        .unwrap();
    assert_eq!((report.records, report.successes, report.written), (1, 1, 1));

    let result = dispatcher
        .dispatch(DispatchMode::Document, Cursor::new("{\"fail\": true}"), &mut CollectingSink::new())
        .await;
    assert!(matches!(result, Err(ConvertError::Mapping(_))));
}

#[test]
fn auto_mode_follows_file_name() {
    assert_eq!(DispatchMode::resolve(LineMode::Auto, "a/b.jsonl.gz"), DispatchMode::Line);
    assert_eq!(DispatchMode::resolve(LineMode::Auto, "a/b.json"), DispatchMode::Document);
    assert_eq!(DispatchMode::resolve(LineMode::Line, "a/b.json"), DispatchMode::Line);
    assert_eq!(DispatchMode::resolve(LineMode::Document, "a/b.jsonl"), DispatchMode::Document);
}

async fn run(resolver: &UpdateResolver, marker: &str, input: &str) -> (quarry_convert::DispatchReport, usize) {
    let (policy, log) = (policy(), JobLog::new("job"));
    let dispatcher = RecordDispatcher::new(&TestMapper, LiteralContext::new(&policy, &log))
        .with_reconciliation(Some(Reconciliation {
            resolver,
            dataset_iri: "https://example.com/pubs/",
            kind: "pubs",
            marker: VersionMarker::from(marker),
        }));
    let mut sink = CollectingSink::new();
    let report = dispatcher.dispatch_lines(Cursor::new(input.to_string()), &mut sink).await.unwrap();
    (report, sink.quads.len())
}

#[tokio::test]
async fn cold_start_keeps_only_latest_delivery() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("markers.db");
    let db = db.to_str().unwrap();
    let r1 = r#"{"id":"R","name":"old"}"#;
    let r2 = r#"{"id":"R","name":"new"}"#;

    let detect = UpdateResolver::new(CoordinationStore::open(db, "").await.unwrap(), RunMode::DetectOnly, "b");
    let (report, written) = run(&detect, "002", r2).await;
    assert_eq!((report.successes, report.produced, written), (1, 0, 0));
    run(&detect, "001", r1).await;
    drop(detect);

    let apply = UpdateResolver::new(CoordinationStore::open(db, "").await.unwrap(), RunMode::ColdStart, "b");
    let (_, written_new) = run(&apply, "002", r2).await;
    let (report_old, written_old) = run(&apply, "001", r1).await;

    assert_eq!(written_new, 1);
    assert_eq!(written_old, 0);
    assert_eq!(report_old.successes, 1);
    assert!(report_old.retracted.is_empty());
}

#[tokio::test]
async fn incremental_retracts_obsolete_records() {
    let resolver = UpdateResolver::new(
        CoordinationStore::in_memory().await.unwrap(),
        RunMode::Incremental,
        "b",
    );
    let input = "{\"id\":1,\"name\":\"live\",\"status\":\"active\"}\n{\"id\":2,\"name\":\"gone\",\"status\":\"obsolete\"}\n";

    let (report, written) = run(&resolver, "001", input).await;

    assert_eq!(report.successes, 2);
    assert_eq!(written, 1);
    assert_eq!(report.retracted, vec!["https://example.com/r/gone".to_string()]);
}
