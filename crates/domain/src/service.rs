use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

fn default_namespace() -> String {
    "default".to_string()
}

/// Snapshot of an upstream network service as delivered by the event source.
///
/// Only the fields that drive record derivation are carried.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ServiceObject {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    pub name: String,

    #[serde(default)]
    pub external_addresses: Vec<String>,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl ServiceObject {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            external_addresses: Vec::new(),
            annotations: BTreeMap::new(),
        }
    }

    pub fn with_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external_addresses = addresses.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// True if `other` would derive the same records: same address set
    /// (order and duplicates ignored) and identical annotations.
    pub fn same_derivation_inputs(&self, other: &ServiceObject) -> bool {
        if self.annotations != other.annotations {
            return false;
        }
        let ours: BTreeSet<&str> = self.external_addresses.iter().map(String::as_str).collect();
        let theirs: BTreeSet<&str> = other
            .external_addresses
            .iter()
            .map(String::as_str)
            .collect();
        ours == theirs
    }
}

/// Identity of an upstream object across events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
