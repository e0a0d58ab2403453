/// Event file → Reconcile → Lookup flow
///
/// A JSON-lines event file replayed by the file source drives the whole
/// pipeline, including the end-of-snapshot readiness signal.

#[path = "../common/mod.rs"]
mod common;
use common::{wait_for, TestPluginBuilder};

use k8sdns_domain::RecordType;
use k8sdns_infrastructure::watch::FileEventSource;
use std::io::Write;

fn event_file(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

#[tokio::test]
async fn test_replayed_file_becomes_ready() {
    // Arrange
    let file = event_file(&[
        r#"{"type":"added","object":{"name":"svc1","external_addresses":["10.0.0.1"],"annotations":{"dns.coredns.io/hostname":"a.example.com,b.example.com"}}}"#,
        r#"{"type":"added","object":{"name":"svc2","external_addresses":["2001:db8::2"]}}"#,
        r#"{"type":"updated","old":{"name":"svc2","external_addresses":["2001:db8::2"]},"new":{"name":"svc2","external_addresses":["2001:db8::2","2001:db8::3"]}}"#,
        r#"{"type":"deleted","object":{"name":"svc1"}}"#,
    ]);

    // Act
    let plugin = TestPluginBuilder::new()
        .with_source(Box::new(FileEventSource::new(file.path())))
        .start();
    wait_for(&plugin.stats(), 5).await;

    // Assert: four objects events plus the end-of-file sync
    assert!(plugin.lookup.is_ready());
    assert!(plugin.lookup.execute("a.example.com", RecordType::A).is_none());
    assert!(plugin.lookup.execute("b.example.com", RecordType::A).is_none());
    let svc2 = plugin.lookup.execute("svc2", RecordType::AAAA).unwrap();
    assert_eq!(svc2.len(), 2);
    assert_eq!(plugin.cache.len(), 1);

    plugin.shutdown().await;
}

#[tokio::test]
async fn test_malformed_lines_and_objects_do_not_stop_replay() {
    let file = event_file(&[
        "{ this is not json",
        r#"{"type":"added","object":{"name":"broken","external_addresses":["nope"]}}"#,
        r#"{"type":"added","object":{"name":"fine","external_addresses":["10.0.0.7"]}}"#,
    ]);

    let plugin = TestPluginBuilder::new()
        .with_source(Box::new(FileEventSource::new(file.path())))
        .start();
    wait_for(&plugin.stats(), 3).await;

    assert!(plugin.lookup.is_ready());
    assert!(plugin.lookup.execute("fine", RecordType::A).is_some());
    assert!(plugin.lookup.execute("broken", RecordType::A).is_none());
    assert_eq!(plugin.stats().malformed_objects(), 1);
    assert_eq!(plugin.metrics.malformed_objects(), 1);

    plugin.shutdown().await;
}

#[tokio::test]
async fn test_missing_event_file_never_becomes_ready() {
    let plugin = TestPluginBuilder::new()
        .with_source(Box::new(FileEventSource::new(
            "/nonexistent/k8sdns/events.jsonl",
        )))
        .start();

    // The failed source is reported to the reconciler as a disconnect.
    wait_for(&plugin.stats(), 1).await;

    assert!(!plugin.lookup.is_ready());
    assert_eq!(plugin.stats().events_processed(), 1);
    assert_eq!(plugin.cache.len(), 0);

    plugin.shutdown().await;
}
