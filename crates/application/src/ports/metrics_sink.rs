use k8sdns_domain::RecordType;
use std::sync::Arc;

/// Observability signal raised by the cache, the lookup path and the
/// reconciler. How it is exported is up to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricEvent {
    /// A query for a name inside one of the configured zones
    Request {
        zone: Arc<str>,
        record_type: RecordType,
    },
    /// The query was answered from the cache
    CacheHit {
        zone: Arc<str>,
        record_type: RecordType,
    },
    /// A new (name, type) entry entered the cache
    RecordStored { record_type: RecordType },
    /// A (name, type) entry left the cache
    RecordRemoved { record_type: RecordType },
    /// An upstream object could not be mapped to records
    MalformedObject,
}

/// Injected observability sink. Implementations must be cheap and must not
/// block; `emit` is called on the query hot path.
pub trait MetricsSink: Send + Sync {
    fn emit(&self, event: MetricEvent);
}
