use crate::status::{ReconcilerState, ReconcilerStats, ReconcilerStatus};
use k8sdns_application::ports::{AnswerStore, CacheBatch, CacheKey, MetricEvent, MetricsSink};
use k8sdns_application::services::{DerivedRecords, RecordMapper};
use k8sdns_domain::{MappingError, ObjectKey, RecordType, ResourceEvent, ServiceObject};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Keeps the answer cache in line with the upstream service objects.
///
/// Events are consumed on a single task, so every cache mutation happens in
/// event order. For each object the set of cache keys it last wrote is
/// remembered; updates and deletes only touch those keys.
pub struct ReconcilerJob {
    store: Arc<dyn AnswerStore>,
    mapper: RecordMapper,
    metrics: Arc<dyn MetricsSink>,
    sync_timeout: Duration,
    shutdown: CancellationToken,
    status: Arc<ReconcilerStatus>,
    stats: Arc<ReconcilerStats>,
    owned: HashMap<ObjectKey, BTreeSet<CacheKey>>,
}

impl ReconcilerJob {
    pub fn new(
        store: Arc<dyn AnswerStore>,
        mapper: RecordMapper,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            store,
            mapper,
            metrics,
            sync_timeout: Duration::from_secs(30),
            shutdown: CancellationToken::new(),
            status: Arc::new(ReconcilerStatus::new()),
            stats: Arc::new(ReconcilerStats::default()),
            owned: HashMap::new(),
        }
    }

    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn status(&self) -> Arc<ReconcilerStatus> {
        Arc::clone(&self.status)
    }

    pub fn stats(&self) -> Arc<ReconcilerStats> {
        Arc::clone(&self.stats)
    }

    /// Spawn the reconcile loop on the current runtime.
    pub fn start(self, events: mpsc::Receiver<ResourceEvent>) -> ReconcilerHandle {
        let shutdown = self.shutdown.clone();
        let status = Arc::clone(&self.status);
        let stats = Arc::clone(&self.stats);

        info!(
            sync_timeout_secs = self.sync_timeout.as_secs(),
            "Starting reconciler"
        );
        let task = tokio::spawn(self.run(events));

        ReconcilerHandle {
            shutdown,
            task: Mutex::new(Some(task)),
            status,
            stats,
        }
    }

    async fn run(mut self, mut events: mpsc::Receiver<ResourceEvent>) {
        let deadline = tokio::time::sleep(self.sync_timeout);
        tokio::pin!(deadline);
        let mut sync_warned = false;

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("Reconciler: shutting down");
                    break;
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        info!("Event channel closed, reconciler exiting");
                        break;
                    };
                    let disconnected = matches!(event, ResourceEvent::Disconnected);
                    self.handle(event);
                    if disconnected {
                        deadline.as_mut().reset(Instant::now() + self.sync_timeout);
                        sync_warned = false;
                    }
                }
                _ = &mut deadline, if !sync_warned && !self.is_synced() => {
                    warn!(
                        timeout_secs = self.sync_timeout.as_secs(),
                        tracked_objects = self.owned.len(),
                        "Upstream snapshot not synced yet; answering from a partial cache"
                    );
                    sync_warned = true;
                }
            }
        }

        self.status.set(ReconcilerState::Stopped);
        info!(
            events = self.stats.events_processed(),
            tracked_objects = self.owned.len(),
            "Reconciler stopped"
        );
    }

    fn is_synced(&self) -> bool {
        self.status.state() == ReconcilerState::Synced
    }

    /// Apply one event to the cache.
    pub fn handle(&mut self, event: ResourceEvent) {
        debug!(kind = event.kind(), "Reconciling event");
        match event {
            ResourceEvent::Added { object } => self.on_added(&object),
            ResourceEvent::Updated { old, new } => self.on_updated(&old, &new),
            ResourceEvent::Deleted { object } => self.on_deleted(&object),
            ResourceEvent::Synced => {
                let previous = self.status.set(ReconcilerState::Synced);
                if previous != ReconcilerState::Synced {
                    info!(tracked_objects = self.owned.len(), "Upstream snapshot synced");
                }
            }
            ResourceEvent::Disconnected => {
                self.status.set(ReconcilerState::Initializing);
                warn!("Upstream watch disconnected; not ready until the next sync");
            }
        }
        self.stats.event_processed();
    }

    fn on_added(&mut self, object: &ServiceObject) {
        match self.mapper.derive(object) {
            Ok(derived) => self.reconcile(object.key(), derived),
            Err(e) => self.malformed(object, &e),
        }
    }

    fn on_updated(&mut self, old: &ServiceObject, new: &ServiceObject) {
        if old.key() == new.key() && old.same_derivation_inputs(new) {
            self.stats.update_skipped();
            debug!(object = %new.key(), "Update does not change records, skipped");
            return;
        }

        let derived = match self.mapper.derive(new) {
            Ok(derived) => derived,
            Err(e) => {
                // Previous records stay in place until a valid version arrives.
                self.malformed(new, &e);
                return;
            }
        };

        if old.key() != new.key() {
            self.on_deleted(old);
        }
        self.reconcile(new.key(), derived);
    }

    fn on_deleted(&mut self, object: &ServiceObject) {
        let key = object.key();
        let mut batch = CacheBatch::new();

        match self.owned.remove(&key) {
            Some(owned) => owned.into_iter().for_each(|k| batch.remove(k)),
            None => {
                for name in self.mapper.owner_names(object) {
                    for record_type in RecordType::all() {
                        batch.remove(CacheKey::new(&name, record_type));
                    }
                }
            }
        }

        if batch.is_empty() {
            debug!(object = %key, "Deleted object owned no records");
            return;
        }

        let delta = self.store.apply(batch);
        debug!(object = %key, removed = delta.removed, "Removed records of deleted object");
    }

    /// Make the cache hold exactly `derived` for `key`: upsert every group and
    /// drop keys the object wrote before but no longer produces. One batch,
    /// so readers never see a half-updated object.
    fn reconcile(&mut self, key: ObjectKey, derived: DerivedRecords) {
        for issue in &derived.issues {
            warn!(object = %key, issue = ?issue, "Ignoring unusable field");
        }

        let ttl = derived.ttl;
        let groups = derived.into_groups();
        let previous = self.owned.remove(&key).unwrap_or_default();

        let mut batch = CacheBatch::new();
        for stale in previous.iter().filter(|k| !groups.contains_key(*k)) {
            batch.remove(stale.clone());
        }
        let applied: BTreeSet<CacheKey> = groups.keys().cloned().collect();
        for (cache_key, records) in groups {
            batch.upsert(cache_key, records, ttl);
        }

        if batch.is_empty() {
            debug!(object = %key, "Object produces no records");
            return;
        }

        let delta = self.store.apply(batch);
        self.stats.applied(delta.stored + delta.replaced);
        debug!(
            object = %key,
            stored = delta.stored,
            replaced = delta.replaced,
            removed = delta.removed,
            "Applied records"
        );

        if !applied.is_empty() {
            self.owned.insert(key, applied);
        }
    }

    fn malformed(&self, object: &ServiceObject, error: &MappingError) {
        self.stats.malformed_object();
        self.metrics.emit(MetricEvent::MalformedObject);
        warn!(object = %object.key(), error = %error, "Skipping malformed object");
    }
}

/// Handle to a running reconciler.
pub struct ReconcilerHandle {
    shutdown: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
    status: Arc<ReconcilerStatus>,
    stats: Arc<ReconcilerStats>,
}

impl ReconcilerHandle {
    /// Cancel the task and wait for it to exit. The event being handled when
    /// this is called is finished first. Calling it again is a no-op.
    pub async fn stop(&self) {
        self.shutdown.cancel();
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(task) = task {
            if let Err(e) = task.await {
                error!(error = %e, "Reconciler task failed");
                self.status.set(ReconcilerState::Stopped);
            }
        }
    }

    pub fn state(&self) -> ReconcilerState {
        self.status.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ReconcilerState::Synced
    }

    pub fn status(&self) -> Arc<ReconcilerStatus> {
        Arc::clone(&self.status)
    }

    pub fn stats(&self) -> Arc<ReconcilerStats> {
        Arc::clone(&self.stats)
    }
}
