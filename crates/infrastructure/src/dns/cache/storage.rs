// Answer cache: two-level map behind a single reader/writer lock

use super::CacheMetrics;
use super::CacheMetricsSnapshot;
use k8sdns_application::ports::{
    AnswerStore, CacheBatch, CacheDelta, CacheKey, MetricEvent, MetricsSink,
};
use k8sdns_domain::{dns_name, AnswerSet, DnsRecord, RecordType};
use rustc_hash::FxHashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tracing::{debug, info, warn};

pub(super) type TypeMap = FxHashMap<RecordType, Arc<AnswerSet>>;
pub(super) type NameMap = FxHashMap<String, TypeMap>;

/// Concurrent TTL-bounded store of answer sets keyed by (name, type).
///
/// Invariants:
/// - an inner type map is never empty; removing its last entry removes the
///   name from the outer map
/// - `get` never returns an answer set whose expiry has passed
/// - lazy expiry removes only the exact snapshot the reader saw, so a newer
///   `add` racing the removal survives
pub struct AnswerCache {
    entries: RwLock<NameMap>,
    sink: Arc<dyn MetricsSink>,
    pub(super) metrics: CacheMetrics,
}

/// Gauge changes collected under the lock and emitted after it is released.
#[derive(Default)]
pub(super) struct GaugeChanges {
    stored: Vec<RecordType>,
    removed: Vec<RecordType>,
}

impl GaugeChanges {
    pub(super) fn stored(&mut self, record_type: RecordType) {
        self.stored.push(record_type);
    }

    pub(super) fn removed(&mut self, record_type: RecordType) {
        self.removed.push(record_type);
    }
}

impl AnswerCache {
    pub fn new(sink: Arc<dyn MetricsSink>) -> Self {
        info!("Initializing answer cache");
        Self {
            entries: RwLock::new(NameMap::default()),
            sink,
            metrics: CacheMetrics::default(),
        }
    }

    /// Lookup with an explicit clock reading.
    pub fn get_at(&self, name: &str, record_type: RecordType, now: Instant) -> Option<AnswerSet> {
        let name = dns_name::normalize(name);

        let expired = {
            let entries = self.read();
            match entries.get(&name).and_then(|types| types.get(&record_type)) {
                Some(set) if !set.is_expired_at(now) => {
                    CacheMetrics::bump(&self.metrics.hits, 1);
                    return Some(AnswerSet::clone(set));
                }
                Some(set) => Arc::clone(set),
                None => {
                    CacheMetrics::bump(&self.metrics.misses, 1);
                    return None;
                }
            }
        };

        if self.remove_if_same(&name, record_type, &expired) {
            CacheMetrics::bump(&self.metrics.lazy_deletions, 1);
            debug!(name = %name, record_type = %record_type, "Expired entry removed on read");
        }
        CacheMetrics::bump(&self.metrics.misses, 1);
        None
    }

    /// Upsert with an explicit clock reading; expiry is `now + ttl`.
    pub fn add_at(
        &self,
        name: &str,
        record_type: RecordType,
        records: Vec<DnsRecord>,
        ttl: u32,
        now: Instant,
    ) -> bool {
        let key = CacheKey::new(name, record_type);
        if !self.is_cacheable(&key, &records, ttl) {
            return false;
        }

        let mut changes = GaugeChanges::default();
        let replaced = {
            let mut entries = self.write();
            Self::insert_locked(&mut entries, key.clone(), records, ttl, now, &mut changes)
        };
        self.record_insert(replaced);
        self.publish(changes);

        debug!(key = %key, ttl = ttl, replaced = replaced, "Inserted into cache");
        true
    }

    /// Apply `batch` with an explicit clock reading.
    pub fn apply_at(&self, batch: CacheBatch, now: Instant) -> CacheDelta {
        let mut delta = CacheDelta::default();
        let mut changes = GaugeChanges::default();

        let upserts: Vec<_> = batch
            .upserts
            .into_iter()
            .filter(|u| self.is_cacheable(&u.key, &u.records, u.ttl))
            .collect();

        {
            let mut entries = self.write();
            for key in &batch.removals {
                if Self::remove_locked(&mut entries, &key.name, key.record_type) {
                    changes.removed(key.record_type);
                    delta.removed += 1;
                }
            }
            for upsert in upserts {
                if Self::insert_locked(
                    &mut entries,
                    upsert.key,
                    upsert.records,
                    upsert.ttl,
                    now,
                    &mut changes,
                ) {
                    delta.replaced += 1;
                } else {
                    delta.stored += 1;
                }
            }
        }

        CacheMetrics::bump(&self.metrics.removals, delta.removed);
        CacheMetrics::bump(&self.metrics.insertions, delta.stored);
        CacheMetrics::bump(&self.metrics.replacements, delta.replaced);
        self.publish(changes);
        delta
    }

    /// Number of (name, type) entries, expired ones included until they are
    /// noticed.
    pub fn len(&self) -> usize {
        self.read().values().map(FxHashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Number of distinct names.
    pub fn name_count(&self) -> usize {
        self.read().len()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.read().contains_key(&dns_name::normalize(name))
    }

    /// All keys, sorted. Intended for diagnostics and tests.
    pub fn keys(&self) -> Vec<CacheKey> {
        let entries = self.read();
        let mut keys: Vec<CacheKey> = entries
            .iter()
            .flat_map(|(name, types)| {
                types.keys().map(move |record_type| CacheKey {
                    name: name.clone(),
                    record_type: *record_type,
                })
            })
            .collect();
        keys.sort();
        keys
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        let (entries, names) = {
            let map = self.read();
            (map.values().map(FxHashMap::len).sum(), map.len())
        };
        self.metrics.snapshot(entries, names)
    }

    fn is_cacheable(&self, key: &CacheKey, records: &[DnsRecord], ttl: u32) -> bool {
        if ttl == 0 || records.is_empty() {
            debug!(key = %key, ttl = ttl, records = records.len(), "Not cacheable, ignored");
            CacheMetrics::bump(&self.metrics.rejected_writes, 1);
            return false;
        }
        let consistent = records
            .iter()
            .all(|r| r.record_type() == key.record_type && r.name() == key.name);
        if !consistent {
            warn!(key = %key, "Records do not match their cache key, ignored");
            CacheMetrics::bump(&self.metrics.rejected_writes, 1);
            return false;
        }
        true
    }

    /// Returns true if an entry for the key already existed.
    fn insert_locked(
        entries: &mut NameMap,
        key: CacheKey,
        records: Vec<DnsRecord>,
        ttl: u32,
        now: Instant,
        changes: &mut GaugeChanges,
    ) -> bool {
        let set = Arc::new(AnswerSet::with_ttl(records, now, ttl));
        let replaced = entries
            .entry(key.name)
            .or_default()
            .insert(key.record_type, set)
            .is_some();
        if !replaced {
            changes.stored(key.record_type);
        }
        replaced
    }

    /// Returns true if the entry existed.
    pub(super) fn remove_locked(entries: &mut NameMap, name: &str, record_type: RecordType) -> bool {
        let Some(types) = entries.get_mut(name) else {
            return false;
        };
        let removed = types.remove(&record_type).is_some();
        if types.is_empty() {
            entries.remove(name);
        }
        removed
    }

    /// Compare-then-delete: remove (name, type) only if it still holds
    /// `observed`.
    fn remove_if_same(&self, name: &str, record_type: RecordType, observed: &Arc<AnswerSet>) -> bool {
        let removed = {
            let mut entries = self.write();
            let still_same = entries
                .get(name)
                .and_then(|types| types.get(&record_type))
                .is_some_and(|current| Arc::ptr_eq(current, observed));
            still_same && Self::remove_locked(&mut entries, name, record_type)
        };

        if removed {
            CacheMetrics::bump(&self.metrics.removals, 1);
            self.sink.emit(MetricEvent::RecordRemoved { record_type });
        }
        removed
    }

    fn record_insert(&self, replaced: bool) {
        if replaced {
            CacheMetrics::bump(&self.metrics.replacements, 1);
        } else {
            CacheMetrics::bump(&self.metrics.insertions, 1);
        }
    }

    pub(super) fn publish(&self, changes: GaugeChanges) {
        for record_type in changes.stored {
            self.sink.emit(MetricEvent::RecordStored { record_type });
        }
        for record_type in changes.removed {
            self.sink.emit(MetricEvent::RecordRemoved { record_type });
        }
    }

    pub(super) fn read(&self) -> RwLockReadGuard<'_, NameMap> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn write(&self) -> RwLockWriteGuard<'_, NameMap> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AnswerStore for AnswerCache {
    fn get(&self, name: &str, record_type: RecordType) -> Option<AnswerSet> {
        self.get_at(name, record_type, Instant::now())
    }

    fn add(&self, name: &str, record_type: RecordType, records: Vec<DnsRecord>, ttl: u32) -> bool {
        self.add_at(name, record_type, records, ttl, Instant::now())
    }

    fn remove(&self, name: &str, record_type: RecordType) -> bool {
        let name = dns_name::normalize(name);
        let removed = Self::remove_locked(&mut self.write(), &name, record_type);
        if removed {
            CacheMetrics::bump(&self.metrics.removals, 1);
            self.sink.emit(MetricEvent::RecordRemoved { record_type });
        }
        removed
    }

    fn delete(&self, name: &str) -> usize {
        let name = dns_name::normalize(name);
        let Some(types) = self.write().remove(&name) else {
            return 0;
        };

        let mut changes = GaugeChanges::default();
        for record_type in types.keys() {
            changes.removed(*record_type);
        }
        CacheMetrics::bump(&self.metrics.removals, types.len());
        self.publish(changes);

        debug!(name = %name, removed = types.len(), "Deleted name from cache");
        types.len()
    }

    fn apply(&self, batch: CacheBatch) -> CacheDelta {
        self.apply_at(batch, Instant::now())
    }
}
