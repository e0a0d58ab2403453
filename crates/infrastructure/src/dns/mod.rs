pub mod cache;
pub mod cache_updater;
pub mod events;

pub use cache::{AnswerCache, CacheMetrics, CacheMetricsSnapshot};
pub use cache_updater::CacheUpdater;
pub use events::{DnsMetrics, NoopMetrics};
