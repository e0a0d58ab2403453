// Answer cache: (name, type) -> AnswerSet with lazy TTL expiry

pub mod compaction;
pub mod metrics;
pub mod storage;

pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use storage::AnswerCache;
