use k8sdns_domain::{DnsRecord, DomainError, RecordType};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::ports::{AnswerStore, CacheBatch, CacheKey};

/// Direct writes for records that do not come from the watch stream.
pub struct PushRecordsUseCase {
    store: Arc<dyn AnswerStore>,
}

impl PushRecordsUseCase {
    pub fn new(store: Arc<dyn AnswerStore>) -> Self {
        Self { store }
    }

    /// Store `record` as the whole answer set for its (name, type).
    #[instrument(skip(self, record), fields(record = %record))]
    pub fn push_record(&self, record: DnsRecord) -> bool {
        let name = record.name().to_string();
        let record_type = record.record_type();
        let ttl = record.ttl();
        self.store.add(&name, record_type, vec![record], ttl)
    }

    /// Replace the address records of `name` with `addresses`.
    ///
    /// Literals that do not parse are skipped with a warning. An address
    /// family with no valid literal left is removed, all in one batch.
    /// Returns how many answer sets (A and/or AAAA) were written.
    #[instrument(skip(self, addresses))]
    pub fn update_records(
        &self,
        name: &str,
        addresses: &[String],
        ttl: u32,
    ) -> Result<usize, DomainError> {
        if ttl == 0 {
            return Err(DomainError::InvalidTtl(name.to_string()));
        }

        let mut groups: BTreeMap<RecordType, Vec<DnsRecord>> = BTreeMap::new();
        for raw in addresses {
            let ip = match raw.trim().parse::<IpAddr>() {
                Ok(ip) => ip,
                Err(_) => {
                    warn!(name = %name, address = %raw, "Skipping invalid address");
                    continue;
                }
            };
            let record = DnsRecord::address(name, ip, ttl)?;
            groups.entry(record.record_type()).or_default().push(record);
        }

        let mut batch = CacheBatch::new();
        for record_type in [RecordType::A, RecordType::AAAA] {
            if !groups.contains_key(&record_type) {
                batch.remove(CacheKey::new(name, record_type));
            }
        }
        for (record_type, records) in groups {
            batch.upsert(CacheKey::new(name, record_type), records, ttl);
        }

        let delta = self.store.apply(batch);
        let written = delta.stored + delta.replaced;
        debug!(
            name = %name,
            sets = written,
            removed = delta.removed,
            "Replaced address records"
        );
        Ok(written)
    }

    /// Remove every record for `name`, whatever its type.
    #[instrument(skip(self))]
    pub fn retract(&self, name: &str) -> usize {
        let removed = self.store.delete(name);
        if removed > 0 {
            info!(name = %name, removed = removed, "Retracted records");
        }
        removed
    }
}
