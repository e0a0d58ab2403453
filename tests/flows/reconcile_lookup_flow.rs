/// Reconcile → Lookup flow
///
/// Upstream events go through the reconciler into the cache and come back
/// out through the lookup use case.

#[path = "../common/mod.rs"]
mod common;
use common::{annotated, service, TestPlugin, TestPluginBuilder};

use k8sdns_domain::{RecordType, ResourceEvent};
use std::time::Duration;

// ============================================================================
// Full flow
// ============================================================================

#[tokio::test]
async fn test_snapshot_then_lookup() {
    // Arrange
    let mut plugin = TestPlugin::start();
    assert!(!plugin.lookup.is_ready());

    // Act: initial listing
    plugin
        .send(ResourceEvent::Added {
            object: annotated(
                "svc1",
                &["10.0.0.1"],
                &[("hostname", "a.example.com,b.example.com")],
            ),
        })
        .await;
    plugin.send(ResourceEvent::Synced).await;

    // Assert
    assert!(plugin.lookup.is_ready());
    for name in ["a.example.com", "b.example.com"] {
        let answer = plugin.lookup.execute(name, RecordType::A).unwrap();
        assert_eq!(answer.len(), 1);
        assert_eq!(answer.records()[0].data().to_string(), "10.0.0.1");
        assert_eq!(answer.records()[0].ttl(), 3600);
    }
    assert!(plugin.lookup.execute("svc1", RecordType::A).is_none());

    plugin.shutdown().await;
}

#[tokio::test]
async fn test_ttl_annotation_reaches_answers() {
    let mut plugin = TestPlugin::start();

    plugin
        .send(ResourceEvent::Added {
            object: annotated(
                "svc1",
                &["10.0.0.1"],
                &[("hostname", "a.example.com,b.example.com"), ("ttl", "60")],
            ),
        })
        .await;

    let answer = plugin.lookup.execute("b.example.com", RecordType::A).unwrap();
    assert_eq!(answer.records()[0].ttl(), 60);
    assert!(answer.remaining_ttl(std::time::Instant::now()) <= 60);

    plugin.shutdown().await;
}

#[tokio::test]
async fn test_cname_object_answers_only_cname() {
    let mut plugin = TestPlugin::start();

    plugin
        .send(ResourceEvent::Added {
            object: annotated("svc1", &[], &[("cname", "target.example.com")]),
        })
        .await;

    let cname = plugin.lookup.execute("svc1", RecordType::CNAME).unwrap();
    assert_eq!(cname.len(), 1);
    assert_eq!(cname.records()[0].data().to_string(), "target.example.com");
    assert!(plugin.lookup.execute("svc1", RecordType::A).is_none());
    assert!(plugin.lookup.execute_qtype("svc1", 5).is_some());

    plugin.shutdown().await;
}

#[tokio::test]
async fn test_delete_removes_owned_names_only() {
    // Arrange
    let mut plugin = TestPlugin::start();
    let owner = annotated(
        "svc1",
        &["10.0.0.1"],
        &[("hostname", "a.example.com,b.example.com")],
    );
    plugin
        .send(ResourceEvent::Added {
            object: owner.clone(),
        })
        .await;
    plugin
        .send(ResourceEvent::Added {
            object: service("other", &["10.0.0.2"]),
        })
        .await;

    // Act
    plugin
        .send(ResourceEvent::Deleted { object: owner })
        .await;

    // Assert
    assert!(plugin.lookup.execute("a.example.com", RecordType::A).is_none());
    assert!(plugin.lookup.execute("b.example.com", RecordType::A).is_none());
    assert!(plugin.lookup.execute("other", RecordType::A).is_some());
    assert!(!plugin.cache.contains_name("a.example.com"));
    assert_eq!(plugin.cache.name_count(), 1);

    plugin.shutdown().await;
}

#[tokio::test]
async fn test_zone_filter_and_request_metrics() {
    let mut plugin = TestPluginBuilder::new()
        .with_zones(&["example.com"])
        .start();
    plugin
        .send(ResourceEvent::Added {
            object: annotated(
                "svc1",
                &["10.0.0.1", "2001:db8::1"],
                &[("hostname", "web.example.com,web.example.org")],
            ),
        })
        .await;

    assert!(plugin.lookup.execute("web.example.com", RecordType::AAAA).is_some());
    assert!(plugin.lookup.execute("web.example.com", RecordType::CNAME).is_none());
    // Cached, but outside the configured zone.
    assert!(plugin.lookup.execute("web.example.org", RecordType::A).is_none());

    assert_eq!(plugin.metrics.requests("example.com", RecordType::AAAA), 1);
    assert_eq!(plugin.metrics.cache_hits("example.com", RecordType::AAAA), 1);
    assert_eq!(plugin.metrics.requests("example.com", RecordType::CNAME), 1);
    assert_eq!(plugin.metrics.cache_hits("example.com", RecordType::CNAME), 0);
    assert_eq!(plugin.metrics.snapshot().requests, 2);
    assert_eq!(plugin.metrics.total_records(), 4);

    plugin.shutdown().await;
}

#[tokio::test]
async fn test_short_ttl_records_expire_on_read() {
    let mut plugin = TestPlugin::start();
    plugin
        .send(ResourceEvent::Added {
            object: annotated("svc1", &["10.0.0.1"], &[("ttl", "1")]),
        })
        .await;
    assert!(plugin.lookup.execute("svc1", RecordType::A).is_some());

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert!(plugin.lookup.execute("svc1", RecordType::A).is_none());
    assert!(!plugin.cache.contains_name("svc1"));
    assert_eq!(plugin.metrics.records(RecordType::A), 0);

    plugin.shutdown().await;
}

#[tokio::test]
async fn test_disconnect_drops_readiness_but_keeps_answers() {
    let mut plugin = TestPlugin::start();
    plugin
        .send(ResourceEvent::Added {
            object: service("svc1", &["10.0.0.1"]),
        })
        .await;
    plugin.send(ResourceEvent::Synced).await;

    plugin.send(ResourceEvent::Disconnected).await;

    assert!(!plugin.lookup.is_ready());
    assert!(plugin.lookup.execute("svc1", RecordType::A).is_some());

    plugin.shutdown().await;
}
