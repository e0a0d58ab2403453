use async_trait::async_trait;
use k8sdns_application::ports::EventSource;
use k8sdns_domain::{DomainError, ResourceEvent};
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Replays upstream events from a JSON-lines file.
///
/// Each non-empty line that does not start with `#` is one `ResourceEvent`,
/// for example
/// `{"type":"added","object":{"name":"svc1","external_addresses":["10.0.0.1"]}}`.
/// Unparsable lines are skipped. Events for namespaces outside the allow-list
/// are dropped here, so the reconciler never sees them. `Synced` is sent once
/// the whole file has been delivered.
pub struct FileEventSource {
    path: PathBuf,
    namespaces: Vec<String>,
}

impl FileEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            namespaces: Vec::new(),
        }
    }

    /// Only deliver events for these namespaces (empty = all).
    pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.namespaces = namespaces;
        self
    }
}

#[async_trait]
impl EventSource for FileEventSource {
    async fn run(
        self: Box<Self>,
        events: mpsc::Sender<ResourceEvent>,
        shutdown: CancellationToken,
    ) -> Result<(), DomainError> {
        let file = File::open(&self.path).await.map_err(|e| {
            DomainError::EventSourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        info!(path = %self.path.display(), "Replaying events from file");

        let mut lines = BufReader::new(file).lines();
        let mut line_no = 0usize;
        let mut delivered = 0usize;

        loop {
            let line = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!("FileEventSource: shutting down");
                    return Ok(());
                }
                line = lines.next_line() => line,
            };

            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    return Err(DomainError::EventSourceUnavailable(format!(
                        "{}: {}",
                        self.path.display(),
                        e
                    )));
                }
            };
            line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let event: ResourceEvent = match serde_json::from_str(trimmed) {
                Ok(event) => event,
                Err(e) => {
                    warn!(line = line_no, error = %e, "Skipping unparsable event");
                    continue;
                }
            };

            if !event.in_namespaces(&self.namespaces) {
                debug!(line = line_no, namespace = ?event.namespace(), "Event outside watched namespaces");
                continue;
            }

            if events.send(event).await.is_err() {
                debug!("Event receiver dropped, stopping replay");
                return Ok(());
            }
            delivered += 1;
        }

        info!(delivered = delivered, "Initial event replay complete");
        let _ = events.send(ResourceEvent::Synced).await;
        Ok(())
    }
}
