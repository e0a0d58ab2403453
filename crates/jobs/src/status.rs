use k8sdns_application::ports::ReadinessProbe;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Lifecycle of the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReconcilerState {
    /// Waiting for the initial snapshot, or for a new one after the watch
    /// broke
    Initializing = 0,
    /// The cache reflects the upstream snapshot
    Synced = 1,
    /// The task has exited
    Stopped = 2,
}

impl ReconcilerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ReconcilerState::Synced,
            2 => ReconcilerState::Stopped,
            _ => ReconcilerState::Initializing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcilerState::Initializing => "initializing",
            ReconcilerState::Synced => "synced",
            ReconcilerState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ReconcilerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, lock-free view of the reconciler state. Doubles as the readiness
/// probe handed to the lookup path.
#[derive(Debug)]
pub struct ReconcilerStatus {
    state: AtomicU8,
}

impl ReconcilerStatus {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ReconcilerState::Initializing as u8),
        }
    }

    pub fn state(&self) -> ReconcilerState {
        ReconcilerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Store `state`, returning the previous one.
    pub fn set(&self, state: ReconcilerState) -> ReconcilerState {
        ReconcilerState::from_u8(self.state.swap(state as u8, Ordering::AcqRel))
    }
}

impl Default for ReconcilerStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessProbe for ReconcilerStatus {
    fn is_ready(&self) -> bool {
        self.state() == ReconcilerState::Synced
    }
}

/// Counters maintained by the reconciler task.
#[derive(Debug, Default)]
pub struct ReconcilerStats {
    events_processed: AtomicU64,
    updates_skipped: AtomicU64,
    malformed_objects: AtomicU64,
    records_applied: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerStatsSnapshot {
    pub events_processed: u64,
    pub updates_skipped: u64,
    pub malformed_objects: u64,
    pub records_applied: u64,
}

impl ReconcilerStats {
    pub fn events_processed(&self) -> u64 {
        self.events_processed.load(Ordering::Acquire)
    }

    pub fn updates_skipped(&self) -> u64 {
        self.updates_skipped.load(Ordering::Relaxed)
    }

    pub fn malformed_objects(&self) -> u64 {
        self.malformed_objects.load(Ordering::Relaxed)
    }

    /// Answer sets written (stored or replaced).
    pub fn records_applied(&self) -> u64 {
        self.records_applied.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ReconcilerStatsSnapshot {
        ReconcilerStatsSnapshot {
            events_processed: self.events_processed(),
            updates_skipped: self.updates_skipped(),
            malformed_objects: self.malformed_objects(),
            records_applied: self.records_applied(),
        }
    }

    // Release so a reader that observes the count also observes the cache
    // writes made while handling the event.
    pub(crate) fn event_processed(&self) {
        self.events_processed.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn update_skipped(&self) {
        self.updates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn malformed_object(&self) {
        self.malformed_objects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn applied(&self, count: usize) {
        self.records_applied.fetch_add(count as u64, Ordering::Relaxed);
    }
}
