use k8sdns_domain::{dns_name, AnswerSet, DnsRecord, RecordType};
use std::fmt;

/// (name, type) key of one answer set. The name is always canonical.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub name: String,
    pub record_type: RecordType,
}

impl CacheKey {
    #[inline]
    pub fn new(name: &str, record_type: RecordType) -> Self {
        Self {
            name: dns_name::normalize(name),
            record_type,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.record_type)
    }
}

/// Replacement answer set for one key inside a [`CacheBatch`].
#[derive(Clone, Debug)]
pub struct AnswerUpsert {
    pub key: CacheKey,
    pub records: Vec<DnsRecord>,
    pub ttl: u32,
}

/// Removals and upserts applied together, removals first.
#[derive(Clone, Debug, Default)]
pub struct CacheBatch {
    pub removals: Vec<CacheKey>,
    pub upserts: Vec<AnswerUpsert>,
}

impl CacheBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&mut self, key: CacheKey) {
        self.removals.push(key);
    }

    pub fn upsert(&mut self, key: CacheKey, records: Vec<DnsRecord>, ttl: u32) {
        self.upserts.push(AnswerUpsert { key, records, ttl });
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.upserts.is_empty()
    }
}

/// What a write changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheDelta {
    /// Keys that did not exist before and now do
    pub stored: usize,
    /// Keys whose answer set was replaced in place
    pub replaced: usize,
    /// Keys removed
    pub removed: usize,
}

/// Port for the answer cache.
///
/// All methods are synchronous and never block on I/O; reads must not block
/// other reads. Names are normalised by the implementation.
pub trait AnswerStore: Send + Sync {
    /// Current unexpired answer set for (name, type). An expired entry is
    /// removed and reported as a miss.
    fn get(&self, name: &str, record_type: RecordType) -> Option<AnswerSet>;

    /// Upsert the answer set for exactly (name, type). A zero TTL or an empty
    /// record list is not cacheable: nothing changes and `false` is returned.
    fn add(&self, name: &str, record_type: RecordType, records: Vec<DnsRecord>, ttl: u32) -> bool;

    /// Remove one (name, type) entry. Returns whether it existed.
    fn remove(&self, name: &str, record_type: RecordType) -> bool;

    /// Remove every entry for `name`. Returns how many were removed.
    fn delete(&self, name: &str) -> usize;

    /// Apply a batch atomically with respect to readers.
    fn apply(&self, batch: CacheBatch) -> CacheDelta;
}
