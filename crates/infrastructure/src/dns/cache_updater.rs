use super::cache::AnswerCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Background task that periodically sweeps expired entries out of the
/// answer cache.
pub struct CacheUpdater {
    cache: Arc<AnswerCache>,
    compaction_interval: Duration,
    shutdown: CancellationToken,
}

impl CacheUpdater {
    pub fn new(cache: Arc<AnswerCache>, compaction_interval_secs: u64) -> Self {
        Self {
            cache,
            compaction_interval: Duration::from_secs(compaction_interval_secs.max(1)),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Start background compaction task
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.compaction_interval.as_secs(),
                "Background compaction started"
            );

            let mut interval = tokio::time::interval(self.compaction_interval);
            // The first tick completes immediately; nothing can have expired yet.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("CacheUpdater: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        Self::compaction_cycle(&self.cache);
                    }
                }
            }
        })
    }

    /// Run one compaction cycle
    fn compaction_cycle(cache: &Arc<AnswerCache>) {
        debug!("Starting background compaction cycle");

        let removed = cache.compact();

        if removed > 0 {
            info!(
                removed = removed,
                cache_size = cache.len(),
                "Background compaction completed"
            );
        } else {
            debug!("No entries to compact");
        }
    }
}
