//! Router-level tests: request, scrape and readiness behavior over HTTP.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use hitcount_core::{scrape, Registry};
use hitcount_service::{app_state::AppState, config, router::build_router};

fn app_with(cfg_yaml: &str) -> (AppState, Router) {
    let cfg = config::load_from_str(cfg_yaml).unwrap();
    let state = AppState::new(cfg).unwrap();
    let app = build_router(state.clone());
    (state, app)
}

fn app() -> (AppState, Router) {
    app_with("version: 1\n")
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let ctype = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, ctype, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn hello_then_metrics_scenario() {
    let (_, app) = app();

    for _ in 0..3 {
        let (status, _, _) = get(&app, "/hello").await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, ctype, body) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctype.as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(body, "app_requests_total 3\n");

    get(&app, "/hello").await;
    let (_, _, body) = get(&app, "/metrics").await;
    assert_eq!(body, "app_requests_total 4\n");
}

#[tokio::test]
async fn hello_greets_with_default_and_given_name() {
    let (_, app) = app();

    let (_, ctype, body) = get(&app, "/hello").await;
    assert_eq!(ctype.as_deref(), Some("application/json"));
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["greeting"], "Hello, world!");

    let (_, _, body) = get(&app, "/hello?name=Ada").await;
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["greeting"], "Hello, Ada!");
}

#[tokio::test]
async fn default_name_comes_from_config() {
    let (_, app) = app_with("version: 1\nhello:\n  default_name: there\n");
    let (_, _, body) = get(&app, "/hello").await;
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["greeting"], "Hello, there!");
}

#[tokio::test]
async fn metrics_reads_are_idempotent_and_uncounted() {
    let (state, app) = app();
    get(&app, "/hello").await;

    let (_, _, first) = get(&app, "/metrics").await;
    for _ in 0..10 {
        let (_, _, again) = get(&app, "/metrics").await;
        assert_eq!(again, first);
    }
    get(&app, "/healthz").await;
    get(&app, "/readyz").await;

    assert_eq!(first, "app_requests_total 1\n");
    assert_eq!(state.requests().value(), 1);
}

#[tokio::test]
async fn const_labels_are_exposed() {
    let (_, app) = app_with(
        "version: 1\nmetrics:\n  request_counter: hello_total\n  const_labels:\n    zone: eu\n    service: hello\n",
    );
    get(&app, "/hello?name=x").await;
    let (_, _, body) = get(&app, "/metrics").await;
    assert_eq!(body, "hello_total{service=\"hello\",zone=\"eu\"} 1\n");

    let parsed = scrape::parse(&body).unwrap();
    assert_eq!(parsed[0].labels.len(), 2);
}

#[tokio::test]
async fn invalid_identifier_yields_500() {
    let registry = Arc::new(Registry::new());
    registry.register("broken-name").unwrap();
    let cfg = config::load_from_str("version: 1\n").unwrap();
    let state = AppState::with_registry(cfg, registry).unwrap();
    let app = build_router(state);

    let (status, _, body) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("app_requests_total"));
}

#[tokio::test]
async fn duplicate_request_counter_fails_startup() {
    let registry = Arc::new(Registry::new());
    registry.register("app_requests_total").unwrap();
    let cfg = config::load_from_str("version: 1\n").unwrap();
    let err = AppState::with_registry(cfg, registry).err().expect("must fail");
    assert_eq!(err.client_code().as_str(), "DUPLICATE_METRIC");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_batches_of_fifty() {
    let (_, app) = app();

    let mut tasks = Vec::new();
    for _ in 0..2 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..50 {
                let (status, _, _) = get(&app, "/hello").await;
                assert_eq!(status, StatusCode::OK);
            }
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    let (_, _, body) = get(&app, "/metrics").await;
    assert_eq!(body, "app_requests_total 100\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scrapes_during_traffic_stay_monotonic() {
    let (_, app) = app();

    let writer = {
        let app = app.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                get(&app, "/hello").await;
            }
        })
    };

    let mut prev = scrape::parse(&get(&app, "/metrics").await.2).unwrap();
    while !writer.is_finished() {
        let (status, _, body) = get(&app, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        let cur = scrape::parse(&body).unwrap();
        assert!(scrape::check_scrapes(&prev, &cur).is_empty());
        prev = cur;
    }
    writer.await.unwrap();

    let (_, _, body) = get(&app, "/metrics").await;
    assert_eq!(body, "app_requests_total 200\n");
}

#[tokio::test]
async fn readyz_reports_draining() {
    let (state, app) = app();
    let (status, _, body) = get(&app, "/readyz").await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "ready"));

    state.set_draining();
    let (status, _, body) = get(&app, "/readyz").await;
    assert_eq!((status, body.as_str()), (StatusCode::SERVICE_UNAVAILABLE, "draining"));

    let (status, _, body) = get(&app, "/healthz").await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "ok"));
}

#[tokio::test]
async fn bad_hello_query_is_json_400_and_uncounted() {
    let (state, app) = app();

    let (status, ctype, body) = get(&app, "/hello?name=a&name=b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ctype.as_deref(), Some("application/json"));
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["code"], "BAD_REQUEST");
    assert!(v["msg"].as_str().unwrap().contains("name"));

    assert_eq!(state.requests().value(), 0);
    let (_, _, body) = get(&app, "/metrics").await;
    assert_eq!(body, "app_requests_total 0\n");
}
