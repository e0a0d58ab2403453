use crate::dns_name;
use std::sync::Arc;

/// Zones this resolver answers for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zones {
    /// (canonical name, label), longest first. The root zone is stored as
    /// "" and labelled ".".
    zones: Vec<(String, Arc<str>)>,
}

impl Zones {
    pub fn new<I, S>(zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut zones: Vec<String> = zones
            .into_iter()
            .map(|z| dns_name::normalize(z.as_ref()))
            .collect();
        zones.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        zones.dedup();
        let zones = zones
            .into_iter()
            .map(|zone| {
                let label: Arc<str> = if zone.is_empty() {
                    Arc::from(".")
                } else {
                    Arc::from(zone.as_str())
                };
                (zone, label)
            })
            .collect();
        Self { zones }
    }

    pub fn root() -> Self {
        Self::new(["."])
    }

    /// Label of the most specific zone containing `name` (`"."` for the
    /// root zone). `name` must already be normalised.
    pub fn matching(&self, name: &str) -> Option<&Arc<str>> {
        self.zones
            .iter()
            .find(|(zone, _)| dns_name::is_in_zone(name, zone))
            .map(|(_, label)| label)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl Default for Zones {
    fn default() -> Self {
        Self::root()
    }
}
