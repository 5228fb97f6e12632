//! HTTP surface tests: request decoding, body shapes, and status codes.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tsgate_gateway::app_state::AppState;
use tsgate_gateway::config::GatewayConfig;
use tsgate_gateway::router::build_router;
use tsgate_gateway::store::memory::{Fault, MemoryStore, StoreOp};

fn setup() -> (Router, AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_store(GatewayConfig::default(), store.clone());
    (build_router(state.clone()), state, store)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn ingest(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/timeseries/ingest_data")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn ingest_then_list_and_query() {
    let (app, _state, _store) = setup();

    let (status, body) = send(
        &app,
        ingest(json!([
            { "metric_name": "CPU", "ts": "2024-01-01T00:00:00Z", "value": "10" },
            { "metric_name": "cpu", "ts": "2024-01-01T00:01:00Z", "value": "20" },
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["inserted_rows"], 2);
    assert_eq!(body["data"][1], json!({ "metric_name": "cpu", "ts": "2024-01-01T00:01:00Z", "value": "20" }));

    let (status, body) = send(&app, get("/api/timeseries/list_metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "data": [{ "metric_name": "cpu", "first_seen": "2024-01-01T00:00:00Z", "first_seen_value": "10" }] })
    );

    let (status, body) = send(
        &app,
        get("/api/timeseries/query_data?metric_name=Cpu&start_date=2024-01-01T00:00:00Z&end_date=2024-01-01T00:01:00Z"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["value"], "10");
    assert_eq!(body["data"][1]["value"], "20");
}

#[tokio::test]
async fn default_space_directive_yields_no_data() {
    let (app, _state, _store) = setup();

    let (status, body) = send(
        &app,
        get("/api/timeseries/query_data?metric_name=cpu&start_date=2024-01-01T00:00:00Z&end_date=2024-01-02T00:00:00Z&agg_func=%20&interval=%20"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "no_data", "message": "No records found for this query." }));
}

#[tokio::test]
async fn aggregation_result_is_passed_through() {
    let (app, _state, store) = setup();
    let remote = json!([{ "bucket": "2024-01-01T00:00:00+00:00", "agg_value": 12.5 }]);
    store.set_aggregate_result(remote.clone());

    let (status, body) = send(
        &app,
        get("/api/timeseries/query_data?metric_name=CPU&start_date=2024-01-01T00:00:00Z&end_date=2024-01-02T00:00:00Z&agg_func=max&interval=5min"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "data": remote }));
    assert_eq!(store.calls(StoreOp::SelectRange), 0);
    assert_eq!(store.aggregate_requests()[0].function, "MAX");
}

#[tokio::test]
async fn datastore_errors_stay_http_200() {
    let (app, _state, store) = setup();
    store.fail(StoreOp::InsertMetadata, Fault::Network("connection refused".into()));
    store.fail(StoreOp::ListMetadata, Fault::Remote { status: 401, message: "Invalid API key".into() });

    let (status, body) = send(
        &app,
        ingest(json!([{ "metric_name": "a", "ts": "2024-01-01T00:00:00Z", "value": "1" }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "error", "message": "connection refused" }));

    let (status, body) = send(&app, get("/api/timeseries/list_metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "datastore returned 401: Invalid API key" }));
}

#[tokio::test]
async fn malformed_requests_get_error_body_and_400() {
    let (app, _state, store) = setup();

    let bad_bodies = [
        json!({ "metric_name": "not-a-list" }),
        json!([{ "metric_name": "x" }]),
        json!([{ "metric_name": "x", "ts": "2024-01-01T00:00:00Z" }]),
    ];
    for bad in bad_bodies {
        let (status, body) = send(&app, ingest(bad.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {bad}");
        assert_eq!(body["status"], "error");
        assert!(body["message"].is_string());
    }

    let req = Request::builder()
        .method("POST")
        .uri("/api/timeseries/ingest_data")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("[{\"metric_name\":"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(store.calls(StoreOp::InsertMetadata), 0);

    let (status, body) = send(&app, get("/api/timeseries/query_data?metric_name=cpu")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn ops_endpoints() {
    let (app, state, _store) = setup();

    let resp = app.clone().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.clone().oneshot(get("/readyz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    send(&app, get("/api/timeseries/list_metrics")).await;
    let resp = app.clone().oneshot(get("/metrics")).await.unwrap();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("tsgate_http_requests_total{route=\"list_metrics\",status=\"success\"} 1"));
    assert!(text.contains("tsgate_draining 0"));

    state.set_draining();
    let resp = app.clone().oneshot(get("/readyz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
