//! Axum router wiring.
//!
//! Timeseries API under `/api/timeseries`, operational endpoints at the root.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport::http};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/timeseries/ingest_data", post(http::ingest_data))
        .route("/api/timeseries/query_data", get(http::query_data))
        .route("/api/timeseries/list_metrics", get(http::list_metrics))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
