// tests/metrics.rs
mod common;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use parasport_news::metrics::Metrics;

#[tokio::test]
async fn metrics_endpoint_reports_fallbacks() {
    let metrics = Metrics::init().expect("install recorder");
    // Second init in the same process reuses the recorder.
    let again = Metrics::init().expect("idempotent init");

    let app = common::unconfigured_router().merge(again.router());

    let resp = app
        .clone()
        .oneshot(Request::get("/api/articles/latest").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let m = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(m.status(), StatusCode::OK);
    let body = body::to_bytes(m.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in ["content_requests_total", "content_fallbacks_total", "not_configured"] {
        assert!(text.contains(needle), "metrics exposition missing '{needle}'\n{text}");
    }
    assert!(metrics.handle.render().contains("content_requests_total"));
}
