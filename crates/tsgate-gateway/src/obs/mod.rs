//! In-process service metrics.
//!
//! Counters and histograms are atomics keyed by label sets and rendered in
//! Prometheus text format by the `/metrics` handler.

pub mod metrics;

pub use metrics::ServiceMetrics;
