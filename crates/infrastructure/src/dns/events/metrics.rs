use dashmap::DashMap;
use k8sdns_application::ports::{MetricEvent, MetricsSink};
use k8sdns_domain::RecordType;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn emit(&self, _event: MetricEvent) {}
}

/// In-process metrics tracker.
///
/// Mirrors the exported series: requests and cache hits per (zone, type),
/// and the number of cached entries per type.
#[derive(Clone, Default)]
pub struct DnsMetrics {
    requests: Arc<DashMap<(Arc<str>, RecordType), u64>>,
    cache_hits: Arc<DashMap<(Arc<str>, RecordType), u64>>,
    records: Arc<DashMap<RecordType, AtomicI64>>,
    total_requests: Arc<AtomicU64>,
    total_hits: Arc<AtomicU64>,
    malformed_objects: Arc<AtomicU64>,
}

/// Totals across labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DnsMetricsSnapshot {
    pub requests: u64,
    pub cache_hits: u64,
    pub records: i64,
    pub malformed_objects: u64,
    pub hit_rate: f64,
}

impl DnsMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a metric event
    pub fn track(&self, event: &MetricEvent) {
        match event {
            MetricEvent::Request { zone, record_type } => {
                self.total_requests.fetch_add(1, Ordering::Relaxed);
                *self
                    .requests
                    .entry((Arc::clone(zone), *record_type))
                    .or_insert(0) += 1;
            }
            MetricEvent::CacheHit { zone, record_type } => {
                self.total_hits.fetch_add(1, Ordering::Relaxed);
                *self
                    .cache_hits
                    .entry((Arc::clone(zone), *record_type))
                    .or_insert(0) += 1;
            }
            MetricEvent::RecordStored { record_type } => {
                self.records
                    .entry(*record_type)
                    .or_default()
                    .fetch_add(1, Ordering::Relaxed);
            }
            MetricEvent::RecordRemoved { record_type } => {
                self.records
                    .entry(*record_type)
                    .or_default()
                    .fetch_sub(1, Ordering::Relaxed);
            }
            MetricEvent::MalformedObject => {
                self.malformed_objects.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn requests(&self, zone: &str, record_type: RecordType) -> u64 {
        self.requests
            .get(&(Arc::from(zone), record_type))
            .map(|v| *v)
            .unwrap_or(0)
    }

    pub fn cache_hits(&self, zone: &str, record_type: RecordType) -> u64 {
        self.cache_hits
            .get(&(Arc::from(zone), record_type))
            .map(|v| *v)
            .unwrap_or(0)
    }

    /// Current records gauge for one type.
    pub fn records(&self, record_type: RecordType) -> i64 {
        self.records
            .get(&record_type)
            .map(|v| v.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Current records gauge summed over all types.
    pub fn total_records(&self) -> i64 {
        self.records
            .iter()
            .map(|entry| entry.value().load(Ordering::Relaxed))
            .sum()
    }

    pub fn malformed_objects(&self) -> u64 {
        self.malformed_objects.load(Ordering::Relaxed)
    }

    /// Get hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.total_hits.load(Ordering::Relaxed) as f64 / total as f64
    }

    pub fn snapshot(&self) -> DnsMetricsSnapshot {
        DnsMetricsSnapshot {
            requests: self.total_requests.load(Ordering::Relaxed),
            cache_hits: self.total_hits.load(Ordering::Relaxed),
            records: self.total_records(),
            malformed_objects: self.malformed_objects(),
            hit_rate: self.hit_rate(),
        }
    }
}

impl MetricsSink for DnsMetrics {
    fn emit(&self, event: MetricEvent) {
        self.track(&event);
    }
}

impl std::fmt::Debug for DnsMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsMetrics")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
