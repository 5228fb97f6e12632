//! tsgate core: transport-agnostic row shapes, error types, and the ingest/query
//! workflow rules.
//!
//! This crate owns everything the service decides on its own: how submitted
//! points are normalized, which metadata rows a batch derives, and whether a
//! query becomes a range scan or an aggregation call. It carries no transport
//! or runtime dependencies; the gateway crate does the I/O.
//!
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod ingest;
pub mod model;
pub mod normalize;
pub mod query;

pub use error::{Result, TsGateError};
pub use ingest::IngestBatch;
pub use model::{MetricMetadata, RawPoint, TimeseriesPoint};
pub use normalize::TimestampPolicy;
pub use query::{AggregateQuery, QueryParams, QueryPlan, RangeQuery};
