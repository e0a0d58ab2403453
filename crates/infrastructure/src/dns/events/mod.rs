//! Observability sinks
//!
//! The cache, the lookup path and the reconciler report `MetricEvent`s
//! through the injected `MetricsSink` port. This module provides the sinks.
//!
//! ## Components
//!
//! - `DnsMetrics`: in-process counters (requests, cache hits, records gauge)
//! - `NoopMetrics`: discards everything
//!
//! ## Usage
//!
//! ```rust,no_run
//! use k8sdns_application::ports::MetricsSink;
//! use k8sdns_infrastructure::dns::events::DnsMetrics;
//! use std::sync::Arc;
//!
//! let metrics = DnsMetrics::new();
//! let sink: Arc<dyn MetricsSink> = Arc::new(metrics.clone());
//! // hand `sink` to the cache and the lookup path, read `metrics.snapshot()`
//! ```

pub mod metrics;

pub use metrics::{DnsMetrics, DnsMetricsSnapshot, NoopMetrics};
