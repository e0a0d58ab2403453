#![allow(dead_code)]

use async_trait::async_trait;
use k8sdns_application::ports::{
    AnswerStore, CacheBatch, CacheDelta, EventSource,
};
use k8sdns_application::services::RecordMapper;
use k8sdns_domain::{AnnotationPolicy, AnswerSet, DnsRecord, DomainError, RecordType, ResourceEvent, ServiceObject};
use k8sdns_infrastructure::dns::{AnswerCache, DnsMetrics};
use k8sdns_jobs::{ReconcilerHandle, ReconcilerJob, ReconcilerStats};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub const PREFIX: &str = "dns.coredns.io";

// ============================================================================
// Store wrapper that counts writes
// ============================================================================

pub struct CountingStore {
    pub cache: AnswerCache,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new(metrics: DnsMetrics) -> Self {
        Self {
            cache: AnswerCache::new(Arc::new(metrics)),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl AnswerStore for CountingStore {
    fn get(&self, name: &str, record_type: RecordType) -> Option<AnswerSet> {
        self.cache.get(name, record_type)
    }

    fn add(&self, name: &str, record_type: RecordType, records: Vec<DnsRecord>, ttl: u32) -> bool {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.cache.add(name, record_type, records, ttl)
    }

    fn remove(&self, name: &str, record_type: RecordType) -> bool {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.cache.remove(name, record_type)
    }

    fn delete(&self, name: &str) -> usize {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.cache.delete(name)
    }

    fn apply(&self, batch: CacheBatch) -> CacheDelta {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.cache.apply(batch)
    }
}

// ============================================================================
// Running reconciler fixture
// ============================================================================

pub struct Harness {
    pub store: Arc<CountingStore>,
    pub metrics: DnsMetrics,
    pub handle: ReconcilerHandle,
    pub events: mpsc::Sender<ResourceEvent>,
    sent: u64,
}

impl Harness {
    pub fn start() -> Self {
        Self::start_with_timeout(Duration::from_secs(30))
    }

    pub fn start_with_timeout(sync_timeout: Duration) -> Self {
        let metrics = DnsMetrics::new();
        let store = Arc::new(CountingStore::new(metrics.clone()));
        let (events, rx) = mpsc::channel(64);
        let handle = ReconcilerJob::new(
            Arc::clone(&store) as Arc<dyn AnswerStore>,
            RecordMapper::new(AnnotationPolicy::new(PREFIX, 3600)),
            Arc::new(metrics.clone()),
        )
        .with_sync_timeout(sync_timeout)
        .start(rx);

        Self {
            store,
            metrics,
            handle,
            events,
            sent: 0,
        }
    }

    /// Send `event` and wait until the reconciler has handled it.
    pub async fn send(&mut self, event: ResourceEvent) {
        self.events.send(event).await.expect("reconciler is running");
        self.sent += 1;
        wait_for_events(&self.handle.stats(), self.sent).await;
    }

    pub fn cache(&self) -> &AnswerCache {
        &self.store.cache
    }
}

pub async fn wait_for_events(stats: &ReconcilerStats, count: u64) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while stats.events_processed() < count {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("reconciler did not process events in time");
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn service(name: &str, addresses: &[&str]) -> ServiceObject {
    ServiceObject::new("default", name).with_addresses(addresses.iter().copied())
}

pub fn annotated(name: &str, addresses: &[&str], annotations: &[(&str, &str)]) -> ServiceObject {
    annotations
        .iter()
        .fold(service(name, addresses), |object, (key, value)| {
            object.with_annotation(&format!("{PREFIX}/{key}"), value)
        })
}

// ============================================================================
// Scripted event source
// ============================================================================

/// Sends a fixed list of events, then waits for cancellation.
pub struct ScriptedSource {
    events: Vec<ResourceEvent>,
}

impl ScriptedSource {
    pub fn new(events: Vec<ResourceEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn run(
        self: Box<Self>,
        events: mpsc::Sender<ResourceEvent>,
        shutdown: CancellationToken,
    ) -> Result<(), DomainError> {
        for event in self.events {
            if events.send(event).await.is_err() {
                return Ok(());
            }
        }
        shutdown.cancelled().await;
        Ok(())
    }
}

/// Sends a fixed list of events, then fails as if the watch broke.
pub struct FailingSource {
    events: Vec<ResourceEvent>,
}

impl FailingSource {
    pub fn new(events: Vec<ResourceEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl EventSource for FailingSource {
    async fn run(
        self: Box<Self>,
        events: mpsc::Sender<ResourceEvent>,
        _shutdown: CancellationToken,
    ) -> Result<(), DomainError> {
        for event in self.events {
            let _ = events.send(event).await;
        }
        Err(DomainError::EventSourceUnavailable("watch closed".to_string()))
    }
}
