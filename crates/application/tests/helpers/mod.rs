#![allow(dead_code)]

use k8sdns_application::ports::{
    AnswerStore, CacheBatch, CacheDelta, CacheKey, MetricEvent, MetricsSink, ReadinessProbe,
};
use k8sdns_domain::{AnswerSet, DnsRecord, RecordType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

// ============================================================================
// Mock AnswerStore
// ============================================================================

/// Flat in-memory store that never expires anything.
pub struct MockAnswerStore {
    entries: Mutex<HashMap<CacheKey, AnswerSet>>,
    get_calls: AtomicU64,
}

impl MockAnswerStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            get_calls: AtomicU64::new(0),
        }
    }

    pub fn get_calls(&self) -> u64 {
        self.get_calls.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<_> = self.entries.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl AnswerStore for MockAnswerStore {
    fn get(&self, name: &str, record_type: RecordType) -> Option<AnswerSet> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap()
            .get(&CacheKey::new(name, record_type))
            .cloned()
    }

    fn add(&self, name: &str, record_type: RecordType, records: Vec<DnsRecord>, ttl: u32) -> bool {
        if ttl == 0 || records.is_empty() {
            return false;
        }
        self.entries.lock().unwrap().insert(
            CacheKey::new(name, record_type),
            AnswerSet::with_ttl(records, Instant::now(), ttl),
        );
        true
    }

    fn remove(&self, name: &str, record_type: RecordType) -> bool {
        self.entries
            .lock()
            .unwrap()
            .remove(&CacheKey::new(name, record_type))
            .is_some()
    }

    fn delete(&self, name: &str) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        let name = k8sdns_domain::dns_name::normalize(name);
        entries.retain(|key, _| key.name != name);
        before - entries.len()
    }

    fn apply(&self, batch: CacheBatch) -> CacheDelta {
        let mut delta = CacheDelta::default();
        for key in batch.removals {
            if self.remove(&key.name, key.record_type) {
                delta.removed += 1;
            }
        }
        for upsert in batch.upserts {
            if self.add(&upsert.key.name, upsert.key.record_type, upsert.records, upsert.ttl) {
                delta.stored += 1;
            }
        }
        delta
    }
}

// ============================================================================
// Recording MetricsSink
// ============================================================================

pub struct RecordingMetrics {
    events: Mutex<Vec<MetricEvent>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<MetricEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingMetrics {
    fn emit(&self, event: MetricEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ============================================================================
// Switchable readiness
// ============================================================================

pub struct StaticReadiness(AtomicBool);

impl StaticReadiness {
    pub fn new(ready: bool) -> Self {
        Self(AtomicBool::new(ready))
    }

    pub fn set(&self, ready: bool) {
        self.0.store(ready, Ordering::Relaxed);
    }
}

impl ReadinessProbe for StaticReadiness {
    fn is_ready(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
