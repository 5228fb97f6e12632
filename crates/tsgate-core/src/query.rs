//! Query routing: raw range scan vs. server-side aggregation.
//!
//! A query is routed to aggregation only when `agg_func` is non-blank after
//! trimming. The HTTP default for both directive fields is a single space,
//! which therefore means "absent".

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::normalize::{normalize_metric_name, normalize_timestamp_str, TimestampPolicy};

/// Name of the server-side aggregation function.
pub const AGGREGATE_FUNCTION: &str = "aggregate_timeseries";

/// Default for omitted directive fields.
pub const ABSENT_DIRECTIVE: &str = " ";

/// Query parameters as received on `query_data`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    pub metric_name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "absent_directive")]
    pub agg_func: String,
    #[serde(default = "absent_directive")]
    pub interval: String,
}

fn absent_directive() -> String {
    ABSENT_DIRECTIVE.to_string()
}

/// Inclusive `[start, end]` scan of one metric, ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub metric_name: String,
    pub start: String,
    pub end: String,
}

/// Arguments of the aggregation call; field names are the remote parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateQuery {
    #[serde(rename = "p_metric_name")]
    pub metric_name: String,
    #[serde(rename = "p_start")]
    pub start: String,
    #[serde(rename = "p_end")]
    pub end: String,
    #[serde(rename = "p_agg_function")]
    pub function: String,
    #[serde(rename = "p_interval")]
    pub interval: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    Range(RangeQuery),
    Aggregate(AggregateQuery),
}

impl QueryPlan {
    pub fn from_params(params: &QueryParams, policy: TimestampPolicy) -> Result<Self> {
        let metric_name = normalize_metric_name(&params.metric_name);
        let start = normalize_timestamp_str(&params.start_date, policy)?;
        let end = normalize_timestamp_str(&params.end_date, policy)?;

        if has_directive(&params.agg_func) {
            Ok(QueryPlan::Aggregate(AggregateQuery {
                metric_name,
                start,
                end,
                function: params.agg_func.to_uppercase(),
                interval: params.interval.clone(),
            }))
        } else {
            Ok(QueryPlan::Range(RangeQuery { metric_name, start, end }))
        }
    }

    /// Short label for logs and metrics.
    pub fn mode(&self) -> &'static str {
        match self {
            QueryPlan::Range(_) => "range",
            QueryPlan::Aggregate(_) => "aggregate",
        }
    }
}

/// True when an aggregation directive is present.
pub fn has_directive(agg_func: &str) -> bool {
    !agg_func.trim().is_empty()
}
