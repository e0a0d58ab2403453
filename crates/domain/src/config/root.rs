use super::{ConfigError, LoggingConfig, PluginConfig, ReconcilerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration, read from TOML.
///
/// ```toml
/// [plugin]
/// zones = ["example.com"]
/// ttl = 300
/// annotation_prefix = "dns.coredns.io"
/// namespaces = ["web"]
///
/// [reconciler]
/// event_buffer = 1024
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub plugin: PluginConfig,

    #[serde(default)]
    pub reconciler: ReconcilerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub ttl: Option<u32>,
    pub annotation_prefix: Option<String>,
    pub zones: Option<Vec<String>>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load from `path` (defaults if `None`) and apply CLI overrides.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(ttl) = overrides.ttl {
            self.plugin.ttl = ttl;
        }
        if let Some(prefix) = overrides.annotation_prefix {
            self.plugin.annotation_prefix = prefix;
        }
        if let Some(zones) = overrides.zones {
            self.plugin.zones = zones;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plugin.ttl == 0 {
            return Err(ConfigError::Validation(
                "plugin.ttl must be greater than zero".to_string(),
            ));
        }
        if self.plugin.annotation_prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "plugin.annotation_prefix cannot be empty".to_string(),
            ));
        }
        if self.plugin.zones.is_empty() {
            return Err(ConfigError::Validation(
                "plugin.zones must list at least one zone".to_string(),
            ));
        }
        if self.reconciler.event_buffer == 0 {
            return Err(ConfigError::Validation(
                "reconciler.event_buffer must be greater than zero".to_string(),
            ));
        }
        if !self.logging.is_valid_level() {
            return Err(ConfigError::Validation(format!(
                "logging.level '{}' is not one of trace, debug, info, warn, error",
                self.logging.level
            )));
        }
        Ok(())
    }
}
