//! The three timeseries operations: ingest, query, list metadata.
//!
//! Every operation returns a reply value, never an error: datastore failures
//! are logged, counted, and folded into the reply body.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use tsgate_core::error::{Result, TsGateError};
use tsgate_core::{
    IngestBatch, MetricMetadata, QueryParams, QueryPlan, RawPoint, TimeseriesPoint, TimestampPolicy,
};

use crate::obs::ServiceMetrics;
use crate::store::Datastore;

pub const NO_DATA_MESSAGE: &str = "No records found for this query.";

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestReply {
    Success {
        inserted_rows: usize,
        data: Vec<TimeseriesPoint>,
    },
    Error {
        message: String,
    },
}

impl IngestReply {
    pub fn status(&self) -> &'static str {
        match self {
            IngestReply::Success { .. } => "success",
            IngestReply::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryReply {
    Success(QueryData),
    NoData { message: String },
    Error { message: String },
}

/// Body of a successful query: raw points, or the aggregation result as returned.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QueryData {
    Points {
        count: usize,
        data: Vec<TimeseriesPoint>,
    },
    Aggregated {
        data: Value,
    },
}

impl QueryReply {
    /// Network-class failures and everything else carry different prefixes.
    pub fn from_error(e: &TsGateError) -> Self {
        let message = if e.is_transport() {
            format!("Network error: {e}")
        } else {
            format!("Unexpected error: {e}")
        };
        QueryReply::Error { message }
    }

    pub fn status(&self) -> &'static str {
        match self {
            QueryReply::Success(_) => "success",
            QueryReply::NoData { .. } => "no_data",
            QueryReply::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ListReply {
    Data { data: Vec<MetricMetadata> },
    Error { error: String },
}

impl ListReply {
    pub fn status(&self) -> &'static str {
        match self {
            ListReply::Data { .. } => "success",
            ListReply::Error { .. } => "error",
        }
    }
}

pub struct TimeseriesService {
    store: Arc<dyn Datastore>,
    metrics: Arc<ServiceMetrics>,
    policy: TimestampPolicy,
}

impl TimeseriesService {
    pub fn new(store: Arc<dyn Datastore>, metrics: Arc<ServiceMetrics>, policy: TimestampPolicy) -> Self {
        Self { store, metrics, policy }
    }

    pub fn store(&self) -> &Arc<dyn Datastore> {
        &self.store
    }

    /// Normalize the batch, create metadata for unseen metrics, then append the points.
    ///
    /// The metadata write commits on its own: if the point insert fails afterwards,
    /// the new metadata rows stay.
    pub async fn ingest(&self, raw: &[RawPoint]) -> IngestReply {
        match self.try_ingest(raw).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(points = raw.len(), error = %e, "ingest failed");
                IngestReply::Error { message: e.to_string() }
            }
        }
    }

    async fn try_ingest(&self, raw: &[RawPoint]) -> Result<IngestReply> {
        let batch = IngestBatch::prepare(raw, self.policy)?;
        if batch.is_empty() {
            return Ok(IngestReply::Success { inserted_rows: 0, data: Vec::new() });
        }

        let created = self
            .timed("insert_metadata", self.store.insert_metadata_if_absent(batch.candidates()))
            .await?;
        for m in &created {
            tracing::info!(metric = %m.metric_name, first_seen = %m.first_seen, "new metric");
        }
        self.metrics.metrics_discovered.add(&[], created.len() as u64);

        let inserted = self
            .timed("insert_points", self.store.insert_points(batch.points()))
            .await?;
        self.metrics.points_ingested.add(&[], inserted.len() as u64);

        tracing::info!(
            points = inserted.len(),
            new_metrics = created.len(),
            "ingested batch"
        );
        Ok(IngestReply::Success {
            inserted_rows: inserted.len(),
            data: inserted,
        })
    }

    /// Range scan, or delegation to the aggregation call when `agg_func` is non-blank.
    pub async fn query(&self, params: &QueryParams) -> QueryReply {
        let plan = match QueryPlan::from_params(params, self.policy) {
            Ok(plan) => plan,
            Err(e) => return QueryReply::from_error(&e),
        };
        self.metrics.queries.inc(&[("mode", plan.mode())]);

        let res = match &plan {
            QueryPlan::Range(range) => self
                .timed("select_range", self.store.select_range(range))
                .await
                .map(|rows| {
                    if rows.is_empty() {
                        QueryReply::NoData { message: NO_DATA_MESSAGE.to_string() }
                    } else {
                        QueryReply::Success(QueryData::Points { count: rows.len(), data: rows })
                    }
                }),
            QueryPlan::Aggregate(agg) => self
                .timed("aggregate", self.store.aggregate(agg))
                .await
                .map(|data| QueryReply::Success(QueryData::Aggregated { data })),
        };

        res.unwrap_or_else(|e| {
            tracing::warn!(metric = %params.metric_name, mode = plan.mode(), error = %e, "query failed");
            QueryReply::from_error(&e)
        })
    }

    pub async fn list_metadata(&self) -> ListReply {
        match self.timed("list_metadata", self.store.list_metadata()).await {
            Ok(data) => ListReply::Data { data },
            Err(e) => {
                tracing::warn!(error = %e, "list metadata failed");
                ListReply::Error { error: e.to_string() }
            }
        }
    }

    async fn timed<T, F>(&self, op: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let res = fut.await;
        self.metrics.datastore_duration.observe(&[("op", op)], started.elapsed());
        if let Err(e) = &res {
            self.metrics
                .datastore_errors
                .inc(&[("op", op), ("code", e.client_code().as_str())]);
        }
        res
    }
}
