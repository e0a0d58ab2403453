use crate::service::ServiceObject;
use serde::{Deserialize, Serialize};

/// One change notification from the upstream watch.
///
/// Events for the same object arrive in order; `Synced` marks the end of the
/// initial snapshot and `Disconnected` means the watch broke and readiness
/// must drop until the next `Synced`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceEvent {
    Added {
        object: ServiceObject,
    },
    Updated {
        old: ServiceObject,
        new: ServiceObject,
    },
    Deleted {
        object: ServiceObject,
    },
    Synced,
    Disconnected,
}

impl ResourceEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceEvent::Added { .. } => "added",
            ResourceEvent::Updated { .. } => "updated",
            ResourceEvent::Deleted { .. } => "deleted",
            ResourceEvent::Synced => "synced",
            ResourceEvent::Disconnected => "disconnected",
        }
    }

    /// Namespace of the object the event carries, if any.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            ResourceEvent::Added { object } | ResourceEvent::Deleted { object } => {
                Some(&object.namespace)
            }
            ResourceEvent::Updated { new, .. } => Some(&new.namespace),
            ResourceEvent::Synced | ResourceEvent::Disconnected => None,
        }
    }

    /// Whether the event passes a namespace allow-list (empty = all).
    /// Events without an object always pass.
    pub fn in_namespaces(&self, namespaces: &[String]) -> bool {
        match self.namespace() {
            Some(ns) if !namespaces.is_empty() => namespaces.iter().any(|n| n == ns),
            _ => true,
        }
    }
}
