//! Configuration module for k8sdns
//!
//! - `root`: Main configuration and CLI overrides
//! - `plugin`: Zones, default TTL, annotation prefix, namespace filter
//! - `reconciler`: Event buffering and background task timing
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod errors;
pub mod logging;
pub mod plugin;
pub mod reconciler;
pub mod root;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use plugin::{AnnotationPolicy, PluginConfig};
pub use reconciler::ReconcilerConfig;
pub use root::{CliOverrides, Config};
