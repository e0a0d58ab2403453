use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Background processing settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReconcilerConfig {
    /// Capacity of the event channel between the event source and the
    /// reconciler
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Seconds to wait for the initial snapshot before warning that the
    /// plugin is still not ready
    #[serde(default = "default_sync_timeout_secs")]
    pub sync_timeout_secs: u64,

    /// Seconds between sweeps of expired cache entries (0 disables)
    #[serde(default = "default_compaction_interval_secs")]
    pub compaction_interval_secs: u64,
}

impl ReconcilerConfig {
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            event_buffer: default_event_buffer(),
            sync_timeout_secs: default_sync_timeout_secs(),
            compaction_interval_secs: default_compaction_interval_secs(),
        }
    }
}

fn default_event_buffer() -> usize {
    1024
}

fn default_sync_timeout_secs() -> u64 {
    30
}

fn default_compaction_interval_secs() -> u64 {
    60
}
