use serde::{Deserialize, Serialize};

pub const DEFAULT_ANNOTATION_PREFIX: &str = "dns.coredns.io";
pub const DEFAULT_TTL: u32 = 3600;

/// Settings that shape which queries are answered and how upstream objects
/// become records.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginConfig {
    /// Zones answered from the cache (default: the root zone)
    #[serde(default = "default_zones")]
    pub zones: Vec<String>,

    /// TTL in seconds for records whose object has no TTL annotation
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Prefix of the `<prefix>/hostname`, `<prefix>/ttl` and
    /// `<prefix>/cname` annotation keys
    #[serde(default = "default_annotation_prefix")]
    pub annotation_prefix: String,

    /// Namespaces to watch; empty means all. Applied by the event source.
    #[serde(default)]
    pub namespaces: Vec<String>,
}

impl PluginConfig {
    pub fn annotation_policy(&self) -> AnnotationPolicy {
        AnnotationPolicy::new(&self.annotation_prefix, self.ttl)
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            zones: default_zones(),
            ttl: default_ttl(),
            annotation_prefix: default_annotation_prefix(),
            namespaces: Vec::new(),
        }
    }
}

fn default_zones() -> Vec<String> {
    vec![".".to_string()]
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_annotation_prefix() -> String {
    DEFAULT_ANNOTATION_PREFIX.to_string()
}

/// Resolved annotation keys plus the fallback TTL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationPolicy {
    pub hostname_key: String,
    pub ttl_key: String,
    pub cname_key: String,
    pub default_ttl: u32,
}

impl AnnotationPolicy {
    pub fn new(prefix: &str, default_ttl: u32) -> Self {
        let prefix = prefix.trim_end_matches('/');
        Self {
            hostname_key: format!("{prefix}/hostname"),
            ttl_key: format!("{prefix}/ttl"),
            cname_key: format!("{prefix}/cname"),
            default_ttl,
        }
    }
}

impl Default for AnnotationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ANNOTATION_PREFIX, DEFAULT_TTL)
    }
}
