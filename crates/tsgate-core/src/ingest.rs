//! Ingest batch preparation.
//!
//! Turns an ordered list of raw submissions into the two bulk writes the
//! gateway performs: the metadata candidates (first occurrence per metric, in
//! batch order) and the normalized points. Whether a candidate is actually new
//! is decided by the datastore's insert-if-absent, not here.

use std::collections::HashSet;

use crate::error::Result;
use crate::model::{scalar_to_string, MetricMetadata, RawPoint, TimeseriesPoint};
use crate::normalize::{normalize_metric_name, normalize_timestamp, TimestampPolicy};

/// Normalized, ready-to-write ingest batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestBatch {
    points: Vec<TimeseriesPoint>,
    candidates: Vec<MetricMetadata>,
}

impl IngestBatch {
    /// Normalize every submission and derive one metadata candidate per distinct metric.
    ///
    /// Under [`TimestampPolicy::Strict`] the first unparseable timestamp fails the batch.
    pub fn prepare(raw: &[RawPoint], policy: TimestampPolicy) -> Result<Self> {
        let mut points = Vec::with_capacity(raw.len());
        let mut candidates = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for item in raw {
            let point = normalize_point(item, policy)?;

            if seen.insert(point.metric_name.clone()) {
                candidates.push(MetricMetadata {
                    metric_name: point.metric_name.clone(),
                    first_seen: point.ts.clone(),
                    first_seen_value: point.value.clone(),
                });
            }
            points.push(point);
        }

        Ok(Self { points, candidates })
    }

    pub fn points(&self) -> &[TimeseriesPoint] {
        &self.points
    }

    /// Metadata rows to insert-if-absent, one per distinct metric name.
    pub fn candidates(&self) -> &[MetricMetadata] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Normalize a single submission.
pub fn normalize_point(item: &RawPoint, policy: TimestampPolicy) -> Result<TimeseriesPoint> {
    Ok(TimeseriesPoint {
        metric_name: normalize_metric_name(&item.metric_name),
        ts: normalize_timestamp(&item.ts, policy)?,
        value: scalar_to_string(&item.value),
    })
}
