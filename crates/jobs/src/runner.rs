use crate::{ReconcilerHandle, ReconcilerJob};
use k8sdns_application::ports::EventSource;
use k8sdns_domain::ResourceEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Central orchestrator for the background tasks.
///
/// Use the builder pattern to register tasks, then call `.start()` once.
///
/// # Example
///
/// ```rust,ignore
/// let handles = JobRunner::new(shutdown.clone())
///     .with_event_buffer(1024)
///     .with_event_source(Box::new(FileEventSource::new("events.jsonl")))
///     .with_reconciler(ReconcilerJob::new(cache, mapper, metrics))
///     .start();
/// ```
pub struct JobRunner {
    shutdown: CancellationToken,
    event_buffer: usize,
    event_source: Option<Box<dyn EventSource>>,
    reconciler: Option<ReconcilerJob>,
}

/// Running tasks started by [`JobRunner::start`].
pub struct JobHandles {
    pub reconciler: Option<ReconcilerHandle>,
    pub event_source: Option<JoinHandle<()>>,
    /// Extra sender into the reconciler's channel. Keeps the channel open
    /// after a finite event source is exhausted.
    pub events: Option<mpsc::Sender<ResourceEvent>>,
    shutdown: CancellationToken,
}

impl JobRunner {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            event_buffer: 1024,
            event_source: None,
            reconciler: None,
        }
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }

    pub fn with_event_source(mut self, source: Box<dyn EventSource>) -> Self {
        self.event_source = Some(source);
        self
    }

    pub fn with_reconciler(mut self, job: ReconcilerJob) -> Self {
        self.reconciler = Some(job);
        self
    }

    /// Start all registered background tasks.
    pub fn start(self) -> JobHandles {
        info!("Starting background job runner");

        let mut handles = JobHandles {
            reconciler: None,
            event_source: None,
            events: None,
            shutdown: self.shutdown.clone(),
        };

        let Some(job) = self.reconciler else {
            if self.event_source.is_some() {
                warn!("Event source registered without a reconciler; not started");
            }
            return handles;
        };

        let (tx, rx) = mpsc::channel(self.event_buffer);
        handles.reconciler = Some(
            job.with_cancellation(self.shutdown.child_token())
                .start(rx),
        );

        if let Some(source) = self.event_source {
            let events = tx.clone();
            let on_failure = tx.clone();
            let token = self.shutdown.child_token();
            handles.event_source = Some(tokio::spawn(async move {
                match source.run(events, token).await {
                    Ok(()) => info!("Event source finished"),
                    Err(e) => {
                        error!(error = %e, "Event source failed");
                        // The watch is gone; readiness must not outlive it.
                        let _ = on_failure.send(ResourceEvent::Disconnected).await;
                    }
                }
            }));
        }
        handles.events = Some(tx);

        info!("All background jobs started");
        handles
    }
}

impl JobHandles {
    /// Cancel everything and wait for the tasks to exit.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        self.events.take();

        if let Some(reconciler) = &self.reconciler {
            reconciler.stop().await;
        }
        if let Some(source) = self.event_source.take() {
            if let Err(e) = source.await {
                error!(error = %e, "Event source task failed");
            }
        }
        info!("Background jobs stopped");
    }
}
