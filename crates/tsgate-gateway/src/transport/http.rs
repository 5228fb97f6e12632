//! HTTP handlers for `/api/timeseries/*`.
//!
//! Operation results are always HTTP 200 with a `status` (or `error`) field in
//! the body. Requests that cannot be decoded (bad JSON body, wrong shape,
//! missing query parameters) get HTTP 400 with the same body shape.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use tsgate_core::{QueryParams, RawPoint};

use crate::app_state::AppState;
use crate::services::{IngestReply, QueryReply};

fn record(app: &AppState, route: &'static str, status: &str) {
    app.metrics()
        .http_requests
        .inc(&[("route", route), ("status", status)]);
}

pub async fn ingest_data(
    State(app): State<AppState>,
    body: Result<Json<Vec<RawPoint>>, JsonRejection>,
) -> Response {
    let raw = match body {
        Ok(Json(raw)) => raw,
        Err(rej) => {
            tracing::debug!(error = %rej.body_text(), "rejected ingest body");
            record(&app, "ingest_data", "rejected");
            let reply = IngestReply::Error { message: rej.body_text() };
            return (StatusCode::BAD_REQUEST, Json(reply)).into_response();
        }
    };

    let reply = app.service().ingest(&raw).await;
    record(&app, "ingest_data", reply.status());
    (StatusCode::OK, Json(reply)).into_response()
}

pub async fn query_data(
    State(app): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(p)) => p,
        Err(rej) => {
            record(&app, "query_data", "rejected");
            let reply = QueryReply::Error { message: rej.body_text() };
            return (StatusCode::BAD_REQUEST, Json(reply)).into_response();
        }
    };

    let reply = app.service().query(&params).await;
    record(&app, "query_data", reply.status());
    (StatusCode::OK, Json(reply)).into_response()
}

pub async fn list_metrics(State(app): State<AppState>) -> Response {
    let reply = app.service().list_metadata().await;
    record(&app, "list_metrics", reply.status());
    (StatusCode::OK, Json(reply)).into_response()
}
