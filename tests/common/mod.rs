#![allow(dead_code)]

use k8sdns_application::ports::{AnswerStore, EventSource, MetricsSink};
use k8sdns_application::services::RecordMapper;
use k8sdns_application::use_cases::LookupRecordsUseCase;
use k8sdns_domain::{AnnotationPolicy, ResourceEvent, ServiceObject, Zones};
use k8sdns_infrastructure::dns::{AnswerCache, DnsMetrics};
use k8sdns_jobs::{JobHandles, JobRunner, ReconcilerJob, ReconcilerStats};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const PREFIX: &str = "dns.coredns.io";

/// The whole pipeline: event channel, reconciler, cache and lookup.
pub struct TestPlugin {
    pub cache: Arc<AnswerCache>,
    pub metrics: DnsMetrics,
    pub lookup: LookupRecordsUseCase,
    pub jobs: JobHandles,
    sent: u64,
}

pub struct TestPluginBuilder {
    zones: Vec<String>,
    default_ttl: u32,
    source: Option<Box<dyn EventSource>>,
}

impl TestPluginBuilder {
    pub fn new() -> Self {
        Self {
            zones: vec![".".to_string()],
            default_ttl: 3600,
            source: None,
        }
    }

    pub fn with_zones(mut self, zones: &[&str]) -> Self {
        self.zones = zones.iter().map(|z| z.to_string()).collect();
        self
    }

    pub fn with_default_ttl(mut self, ttl: u32) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_source(mut self, source: Box<dyn EventSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn start(self) -> TestPlugin {
        let metrics = DnsMetrics::new();
        let sink: Arc<dyn MetricsSink> = Arc::new(metrics.clone());
        let cache = Arc::new(AnswerCache::new(Arc::clone(&sink)));
        let store: Arc<dyn AnswerStore> = cache.clone();

        let reconciler = ReconcilerJob::new(
            Arc::clone(&store),
            RecordMapper::new(AnnotationPolicy::new(PREFIX, self.default_ttl)),
            Arc::clone(&sink),
        );
        let status = reconciler.status();

        let mut runner = JobRunner::new(CancellationToken::new())
            .with_event_buffer(16)
            .with_reconciler(reconciler);
        if let Some(source) = self.source {
            runner = runner.with_event_source(source);
        }
        let jobs = runner.start();

        let lookup = LookupRecordsUseCase::new(store, Zones::new(&self.zones), sink, status);

        TestPlugin {
            cache,
            metrics,
            lookup,
            jobs,
            sent: 0,
        }
    }
}

impl TestPlugin {
    pub fn start() -> Self {
        TestPluginBuilder::new().start()
    }

    /// Push `event` through the channel and wait until it has been applied.
    pub async fn send(&mut self, event: ResourceEvent) {
        let events = self.jobs.events.as_ref().expect("reconciler running");
        events.send(event).await.expect("reconciler accepts events");
        self.sent += 1;
        let stats = self.stats();
        wait_for(&stats, self.sent).await;
    }

    pub fn stats(&self) -> Arc<ReconcilerStats> {
        self.jobs
            .reconciler
            .as_ref()
            .expect("reconciler running")
            .stats()
    }

    pub async fn shutdown(self) {
        self.jobs.shutdown().await;
    }
}

pub async fn wait_for(stats: &ReconcilerStats, count: u64) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while stats.events_processed() < count {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("events not processed in time");
}

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
