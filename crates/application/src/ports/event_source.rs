use async_trait::async_trait;
use k8sdns_domain::{DomainError, ResourceEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Producer of upstream change notifications.
///
/// Implementations own reconnects and resync scheduling. They push
/// `Synced` once the initial listing has been delivered and `Disconnected`
/// when the watch breaks, and return when `shutdown` is cancelled or the
/// receiver is dropped. Returning an error ends the watch; the job runner
/// then reports `Disconnected` on the source's behalf.
#[async_trait]
pub trait EventSource: Send {
    async fn run(
        self: Box<Self>,
        events: mpsc::Sender<ResourceEvent>,
        shutdown: CancellationToken,
    ) -> Result<(), DomainError>;
}
