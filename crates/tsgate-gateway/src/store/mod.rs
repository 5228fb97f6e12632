//! Datastore seam.
//!
//! The service talks to storage only through [`Datastore`]; the concrete
//! backend is constructed once at startup and injected via `AppState`.

pub mod memory;
pub mod postgrest;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use tsgate_core::error::Result;
use tsgate_core::{AggregateQuery, MetricMetadata, RangeQuery, TimeseriesPoint};

use crate::config::{Backend, Credentials, DatastoreSection};

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;

/// Remote tabular store holding `timeseries` and `metadata`, plus the aggregation call.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Insert metadata rows whose `metric_name` is not yet present; existing rows
    /// are left untouched. Returns only the rows that were created.
    async fn insert_metadata_if_absent(&self, rows: &[MetricMetadata]) -> Result<Vec<MetricMetadata>>;

    /// Append points. Returns the rows as stored.
    async fn insert_points(&self, rows: &[TimeseriesPoint]) -> Result<Vec<TimeseriesPoint>>;

    /// Points of one metric with `start <= ts <= end`, ascending by `ts`.
    async fn select_range(&self, query: &RangeQuery) -> Result<Vec<TimeseriesPoint>>;

    /// Invoke the server-side aggregation; the result is passed through uninterpreted.
    async fn aggregate(&self, query: &AggregateQuery) -> Result<Value>;

    /// Every metadata row.
    async fn list_metadata(&self) -> Result<Vec<MetricMetadata>>;
}

/// Construct the configured backend.
pub fn build(section: &DatastoreSection) -> Result<Arc<dyn Datastore>> {
    match section.backend {
        Backend::Postgrest => {
            let creds = Credentials::from_env(section)?;
            Ok(Arc::new(PostgrestStore::new(&creds, section)?))
        }
        Backend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
