//! In-process datastore.
//!
//! Backs `backend: memory` for local runs and stands in for the hosted store in
//! tests. Both tables sit behind one mutex, so insert-if-absent is atomic.
//! Aggregation is not computed here: callers configure the result the
//! aggregation call returns with [`MemoryStore::set_aggregate_result`].

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use tsgate_core::error::{Result, TsGateError};
use tsgate_core::normalize::parse_instant;
use tsgate_core::{AggregateQuery, MetricMetadata, RangeQuery, TimeseriesPoint};

use super::Datastore;

/// Datastore operations, for call counting and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    InsertMetadata,
    InsertPoints,
    SelectRange,
    Aggregate,
    ListMetadata,
}

/// Error an operation is forced to return.
#[derive(Debug, Clone)]
pub enum Fault {
    Network(String),
    Remote { status: u16, message: String },
}

impl Fault {
    fn to_error(&self) -> TsGateError {
        match self {
            Fault::Network(m) => TsGateError::Transport(m.clone()),
            Fault::Remote { status, message } => TsGateError::Remote {
                status: *status,
                message: message.clone(),
            },
        }
    }
}

#[derive(Default)]
struct Tables {
    metadata: Vec<MetricMetadata>,
    known: HashSet<String>,
    points: Vec<TimeseriesPoint>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    aggregate_result: Mutex<Option<Value>>,
    aggregate_requests: Mutex<Vec<AggregateQuery>>,
    faults: Mutex<HashMap<StoreOp, Fault>>,
    calls: DashMap<StoreOp, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `op` fail with `fault` until [`MemoryStore::clear_faults`].
    pub fn fail(&self, op: StoreOp, fault: Fault) {
        lock(&self.faults).insert(op, fault);
    }

    pub fn clear_faults(&self) {
        lock(&self.faults).clear();
    }

    /// Number of times `op` was invoked (including failed invocations).
    pub fn calls(&self, op: StoreOp) -> usize {
        self.calls.get(&op).map(|c| *c).unwrap_or(0)
    }

    pub fn set_aggregate_result(&self, v: Value) {
        *lock(&self.aggregate_result) = Some(v);
    }

    /// Arguments of the aggregation calls answered with a configured result,
    /// in call order. Nothing is recorded while no result is configured.
    pub fn aggregate_requests(&self) -> Vec<AggregateQuery> {
        lock(&self.aggregate_requests).clone()
    }

    /// Snapshot of the `timeseries` table in insertion order.
    pub fn points(&self) -> Vec<TimeseriesPoint> {
        lock(&self.tables).points.clone()
    }

    fn enter(&self, op: StoreOp) -> Result<()> {
        *self.calls.entry(op).or_insert(0) += 1;
        match lock(&self.faults).get(&op) {
            Some(fault) => Err(fault.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert_metadata_if_absent(&self, rows: &[MetricMetadata]) -> Result<Vec<MetricMetadata>> {
        self.enter(StoreOp::InsertMetadata)?;
        let mut t = lock(&self.tables);
        let mut created = Vec::new();
        for row in rows {
            if t.known.insert(row.metric_name.clone()) {
                t.metadata.push(row.clone());
                created.push(row.clone());
            }
        }
        Ok(created)
    }

    async fn insert_points(&self, rows: &[TimeseriesPoint]) -> Result<Vec<TimeseriesPoint>> {
        self.enter(StoreOp::InsertPoints)?;
        lock(&self.tables).points.extend_from_slice(rows);
        Ok(rows.to_vec())
    }

    async fn select_range(&self, query: &RangeQuery) -> Result<Vec<TimeseriesPoint>> {
        self.enter(StoreOp::SelectRange)?;
        let t = lock(&self.tables);
        let mut out: Vec<TimeseriesPoint> = t
            .points
            .iter()
            .filter(|p| p.metric_name == query.metric_name)
            .filter(|p| {
                compare_ts(&p.ts, &query.start) != Ordering::Less
                    && compare_ts(&p.ts, &query.end) != Ordering::Greater
            })
            .cloned()
            .collect();
        // Unparseable timestamps sort first, lexically.
        out.sort_by_cached_key(|p| (parse_instant(&p.ts), p.ts.clone()));
        Ok(out)
    }

    async fn aggregate(&self, query: &AggregateQuery) -> Result<Value> {
        self.enter(StoreOp::Aggregate)?;
        let result = lock(&self.aggregate_result).clone().ok_or_else(|| TsGateError::Remote {
            status: 501,
            message: "aggregation is not available on the memory backend".into(),
        })?;
        lock(&self.aggregate_requests).push(query.clone());
        Ok(result)
    }

    async fn list_metadata(&self) -> Result<Vec<MetricMetadata>> {
        self.enter(StoreOp::ListMetadata)?;
        Ok(lock(&self.tables).metadata.clone())
    }
}

/// Chronological when both sides parse, lexical otherwise.
fn compare_ts(a: &str, b: &str) -> Ordering {
    match (parse_instant(a), parse_instant(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Poisoned locks are recovered; every mutation here is a single push or extend.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
