//! PostgREST backend (hosted Postgres behind a REST endpoint, e.g. Supabase).
//!
//! Request mapping:
//! - tables live under `{url}/rest/v1/{table}`
//! - every request carries `apikey` and `Authorization: Bearer` with the API key
//! - inserts ask for `Prefer: return=representation`; metadata additionally uses
//!   `resolution=ignore-duplicates` with `on_conflict=metric_name`, which makes
//!   the insert atomic per metric name
//! - the aggregation is `POST {url}/rest/v1/rpc/aggregate_timeseries`
//!
//! A single client with a fixed timeout is shared by all requests. Connection
//! failures are retried up to `retries` times; nothing else is retried since
//! the request may already have been applied.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use tsgate_core::error::{Result, TsGateError};
use tsgate_core::query::AGGREGATE_FUNCTION;
use tsgate_core::{AggregateQuery, MetricMetadata, RangeQuery, TimeseriesPoint};

use super::Datastore;
use crate::config::{Credentials, DatastoreSection};

pub const TIMESERIES_TABLE: &str = "timeseries";
pub const METADATA_TABLE: &str = "metadata";

const REST_PREFIX: &str = "/rest/v1";

pub struct PostgrestStore {
    client: Client,
    base: String,
    api_key: String,
    retries: u32,
}

impl PostgrestStore {
    pub fn new(creds: &Credentials, section: &DatastoreSection) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(section.timeout_ms))
            .build()
            .map_err(|e| TsGateError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base: rest_base(&creds.url),
            api_key: creds.api_key.clone(),
            retries: section.retries,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base, path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Send with connect-failure retries and turn non-2xx answers into errors.
    async fn send<F>(&self, op: &'static str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            match build().send().await {
                Ok(resp) => {
                    tracing::debug!(op, status = %resp.status(), attempt, "datastore call");
                    return check_status(resp).await;
                }
                Err(e) if e.is_connect() && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(op, attempt, error = %e, "datastore connect failed, retrying");
                }
                Err(e) => return Err(map_reqwest(e)),
            }
        }
    }
}

#[async_trait]
impl Datastore for PostgrestStore {
    fn name(&self) -> &'static str {
        "postgrest"
    }

    async fn insert_metadata_if_absent(&self, rows: &[MetricMetadata]) -> Result<Vec<MetricMetadata>> {
        let resp = self
            .send("insert_metadata", || {
                self.request(Method::POST, METADATA_TABLE)
                    .query(&[("on_conflict", "metric_name")])
                    .header("Prefer", "return=representation,resolution=ignore-duplicates")
                    .json(rows)
            })
            .await?;
        read_json(resp).await
    }

    async fn insert_points(&self, rows: &[TimeseriesPoint]) -> Result<Vec<TimeseriesPoint>> {
        let resp = self
            .send("insert_points", || {
                self.request(Method::POST, TIMESERIES_TABLE)
                    .header("Prefer", "return=representation")
                    .json(rows)
            })
            .await?;
        read_json(resp).await
    }

    async fn select_range(&self, query: &RangeQuery) -> Result<Vec<TimeseriesPoint>> {
        let filter = [
            ("select", "*".to_string()),
            ("metric_name", format!("eq.{}", query.metric_name)),
            ("ts", format!("gte.{}", query.start)),
            ("ts", format!("lte.{}", query.end)),
            ("order", "ts.asc".to_string()),
        ];
        let resp = self
            .send("select_range", || self.request(Method::GET, TIMESERIES_TABLE).query(&filter))
            .await?;
        read_json(resp).await
    }

    async fn aggregate(&self, query: &AggregateQuery) -> Result<Value> {
        let path = format!("rpc/{AGGREGATE_FUNCTION}");
        let resp = self
            .send("aggregate", || self.request(Method::POST, &path).json(query))
            .await?;

        let body = resp.bytes().await.map_err(map_reqwest)?;
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|e| TsGateError::Decode(format!("aggregate: {e}")))
    }

    async fn list_metadata(&self) -> Result<Vec<MetricMetadata>> {
        let resp = self
            .send("list_metadata", || {
                self.request(Method::GET, METADATA_TABLE).query(&[("select", "*")])
            })
            .await?;
        read_json(resp).await
    }
}

/// `https://x.supabase.co/` -> `https://x.supabase.co/rest/v1`
pub fn rest_base(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with(REST_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{REST_PREFIX}")
    }
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(remote_error(status, &body))
}

/// Prefer PostgREST's `message` field; fall back to the raw body.
fn remote_error(status: StatusCode, body: &str) -> TsGateError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());
    TsGateError::Remote {
        status: status.as_u16(),
        message,
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let body = resp.bytes().await.map_err(map_reqwest)?;
    serde_json::from_slice(&body).map_err(|e| TsGateError::Decode(e.to_string()))
}

fn map_reqwest(e: reqwest::Error) -> TsGateError {
    if e.is_decode() {
        TsGateError::Decode(e.to_string())
    } else if e.is_builder() {
        TsGateError::Internal(format!("request build failed: {e}"))
    } else {
        TsGateError::Transport(e.to_string())
    }
}
