use crate::dns_record::{DnsRecord, RecordType};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// All records sharing one (name, type), plus the instant they stop being
/// valid. Cloning shares the record slice.
#[derive(Debug, Clone)]
pub struct AnswerSet {
    records: Arc<[DnsRecord]>,
    expires_at: Instant,
}

impl AnswerSet {
    pub fn new(records: Vec<DnsRecord>, expires_at: Instant) -> Self {
        Self {
            records: records.into(),
            expires_at,
        }
    }

    pub fn with_ttl(records: Vec<DnsRecord>, now: Instant, ttl: u32) -> Self {
        Self::new(records, now + Duration::from_secs(u64::from(ttl)))
    }

    pub fn records(&self) -> &[DnsRecord] {
        &self.records
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_type(&self) -> Option<RecordType> {
        self.records.first().map(DnsRecord::record_type)
    }

    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Whole seconds left before expiry, saturating at zero.
    pub fn remaining_ttl(&self, now: Instant) -> u32 {
        let secs = self.expires_at.saturating_duration_since(now).as_secs();
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

impl PartialEq for AnswerSet {
    fn eq(&self, other: &Self) -> bool {
        self.expires_at == other.expires_at && self.records == other.records
    }
}

impl Eq for AnswerSet {}
