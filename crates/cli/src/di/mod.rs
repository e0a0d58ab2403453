use k8sdns_application::ports::{AnswerStore, MetricsSink};
use k8sdns_application::services::RecordMapper;
use k8sdns_application::use_cases::{LookupRecordsUseCase, PushRecordsUseCase};
use k8sdns_domain::{Config, Zones};
use k8sdns_infrastructure::dns::{AnswerCache, DnsMetrics};
use k8sdns_jobs::{ReconcilerJob, ReconcilerStatus};
use std::sync::Arc;
use tracing::info;

/// Everything the binary wires together, built from one [`Config`].
pub struct Services {
    pub cache: Arc<AnswerCache>,
    pub metrics: DnsMetrics,
    pub status: Arc<ReconcilerStatus>,
    pub lookup: Arc<LookupRecordsUseCase>,
    pub push: Arc<PushRecordsUseCase>,
}

impl Services {
    /// Build the shared services and the reconciler that feeds them.
    pub fn new(config: &Config) -> (Self, ReconcilerJob) {
        let metrics = DnsMetrics::new();
        let sink: Arc<dyn MetricsSink> = Arc::new(metrics.clone());
        let cache = Arc::new(AnswerCache::new(Arc::clone(&sink)));
        let store: Arc<dyn AnswerStore> = cache.clone();

        let reconciler = ReconcilerJob::new(
            Arc::clone(&store),
            RecordMapper::new(config.plugin.annotation_policy()),
            Arc::clone(&sink),
        )
        .with_sync_timeout(config.reconciler.sync_timeout());
        let status = reconciler.status();

        let lookup = Arc::new(LookupRecordsUseCase::new(
            Arc::clone(&store),
            Zones::new(&config.plugin.zones),
            sink,
            status.clone(),
        ));
        let push = Arc::new(PushRecordsUseCase::new(store));

        info!(zones = config.plugin.zones.len(), "Services initialized");

        (
            Self {
                cache,
                metrics,
                status,
                lookup,
                push,
            },
            reconciler,
        )
    }
}
