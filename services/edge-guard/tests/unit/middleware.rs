//! Middleware Unit Tests
//!
//! Drives the full router with `oneshot`. The upstream is unreachable, so
//! forwarded requests surface as gateway errors, which is enough to tell a
//! forward from a redirect.

use std::time::Duration;

use axum::body::Body;
use edge_guard::middleware::CORRELATION_ID_HEADER;
use edge_guard::{AppState, GuardMetrics, ProviderCookiePolicy, RedirectGuard, UpstreamProxy, build_router};
use http::header::{COOKIE, LOCATION};
use http::{Request, StatusCode};
use session_bridge::{RouteClass, RoutePolicy};
use test_utils::fixtures::MIRROR_COOKIE;
use tower::ServiceExt;

fn router() -> (axum::Router, GuardMetrics) {
    let metrics = GuardMetrics::new().unwrap();
    let state = AppState {
        proxy: UpstreamProxy::new(
            "http://127.0.0.1:9".parse().unwrap(),
            Duration::from_secs(2),
            1024,
        )
        .unwrap(),
        metrics: metrics.clone(),
    };
    let guard =
        RedirectGuard::new(RoutePolicy::default(), ProviderCookiePolicy::default()).unwrap();
    (build_router(state, guard, Duration::from_secs(5)), metrics)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_healthz_is_local_and_public() {
    let (app, _) = router();
    let response = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(&CORRELATION_ID_HEADER));
}

#[tokio::test]
async fn test_redirect_answers_before_upstream() {
    let (app, metrics) = router();
    let response = app.oneshot(get("/dashboard/agents")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/login?redirected=true");
    assert_eq!(
        metrics.decision_count(RouteClass::Protected, "redirect_auth_entry"),
        1
    );
}

#[tokio::test]
async fn test_signed_in_login_redirects_to_landing() {
    let (app, _) = router();
    let request = Request::get("/login")
        .header(COOKIE, MIRROR_COOKIE)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/dashboard?redirected=true");
}

#[tokio::test]
async fn test_allowed_request_is_forwarded() {
    let (app, metrics) = router();
    let response = app.oneshot(get("/login?redirected=true")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(metrics.marker_consumed.get(), 1);
}

#[tokio::test]
async fn test_metrics_endpoint_reports_decisions() {
    let (app, _) = router();
    app.clone().oneshot(get("/chat")).await.unwrap();
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains(
        r#"edge_guard_decisions_total{action="redirect_auth_entry",class="protected-route"} 1"#
    ));
}
