use k8sdns_domain::{dns_name, AnswerSet, RecordType, Zones};
use std::sync::Arc;
use tracing::trace;

use crate::ports::{AnswerStore, MetricEvent, MetricsSink, ReadinessProbe};

/// Query-side entry point used by the serving front end.
///
/// Names outside the configured zones are a miss without touching the
/// cache; inside a zone every query is counted as a request and every
/// answer as a cache hit, both labelled with the matching zone.
pub struct LookupRecordsUseCase {
    store: Arc<dyn AnswerStore>,
    zones: Zones,
    metrics: Arc<dyn MetricsSink>,
    readiness: Arc<dyn ReadinessProbe>,
}

impl LookupRecordsUseCase {
    pub fn new(
        store: Arc<dyn AnswerStore>,
        zones: Zones,
        metrics: Arc<dyn MetricsSink>,
        readiness: Arc<dyn ReadinessProbe>,
    ) -> Self {
        Self {
            store,
            zones,
            metrics,
            readiness,
        }
    }

    pub fn execute(&self, name: &str, record_type: RecordType) -> Option<AnswerSet> {
        let name = dns_name::normalize(name);
        let zone = Arc::clone(self.zones.matching(&name)?);

        self.metrics.emit(MetricEvent::Request {
            zone: Arc::clone(&zone),
            record_type,
        });

        let answer = self.store.get(&name, record_type);
        if answer.is_some() {
            self.metrics.emit(MetricEvent::CacheHit { zone, record_type });
        }

        trace!(
            name = %name,
            record_type = %record_type,
            hit = answer.is_some(),
            "Lookup"
        );

        answer
    }

    /// Lookup by wire-format qtype. Types the cache never holds are a miss.
    pub fn execute_qtype(&self, name: &str, qtype: u16) -> Option<AnswerSet> {
        let record_type = RecordType::from_u16(qtype)?;
        self.execute(name, record_type)
    }

    /// Whether the initial snapshot has been applied. Queries are still
    /// answered from the partial cache while this is false.
    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }
}
