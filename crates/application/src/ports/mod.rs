mod answer_store;
mod event_source;
mod metrics_sink;
mod readiness;

pub use answer_store::{AnswerStore, AnswerUpsert, CacheBatch, CacheDelta, CacheKey};
pub use event_source::EventSource;
pub use metrics_sink::{MetricEvent, MetricsSink};
pub use readiness::ReadinessProbe;
