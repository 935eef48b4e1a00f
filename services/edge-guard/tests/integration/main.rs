//! Proxy Integration Tests
//!
//! Runs the full router against a `wiremock` upstream.

use std::time::Duration;

use axum::body::{Body, to_bytes};
use edge_guard::{
    AppState, GuardMetrics, ProviderCookiePolicy, RedirectGuard, UpstreamProxy, build_router,
};
use http::header::{COOKIE, LOCATION};
use http::{Request, StatusCode};
use session_bridge::RoutePolicy;
use test_utils::fixtures::{MIRROR_COOKIE, PROVIDER_COOKIE};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(upstream: &MockServer, timeout: Duration, max_body: usize) -> axum::Router {
    let state = AppState {
        proxy: UpstreamProxy::new(upstream.uri().parse().unwrap(), timeout, max_body).unwrap(),
        metrics: GuardMetrics::new().unwrap(),
    };
    let guard =
        RedirectGuard::new(RoutePolicy::default(), ProviderCookiePolicy::default()).unwrap();
    build_router(state, guard, Duration::from_secs(10))
}

async fn body_text(response: http::Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_signed_in_dashboard_is_proxied() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .and(header("cookie", MIRROR_COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_string("dashboard"))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = app(&upstream, Duration::from_secs(5), 1024);
    let request = Request::get("/dashboard")
        .header(COOKIE, MIRROR_COOKIE)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "dashboard");
}

#[tokio::test]
async fn test_marker_never_reaches_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .and(query_param("next", "/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("login page"))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = app(&upstream, Duration::from_secs(5), 1024);
    let response = app
        .oneshot(
            Request::get("/login?next=%2Fchat&redirected=true")
                .header(COOKIE, PROVIDER_COOKIE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let received = upstream.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.query(), Some("next=%2Fchat"));
}

#[tokio::test]
async fn test_redirect_does_not_touch_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let app = app(&upstream, Duration::from_secs(5), 1024);
    let response = app
        .oneshot(Request::get("/chat").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/login?redirected=true");
}

#[tokio::test]
async fn test_upstream_redirects_pass_through() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/callback"))
        .respond_with(ResponseTemplate::new(303).insert_header("location", "/dashboard"))
        .mount(&upstream)
        .await;

    let app = app(&upstream, Duration::from_secs(5), 1024);
    let response = app
        .oneshot(
            Request::post("/auth/callback")
                .body(Body::from("code=abc"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/dashboard");
}

#[tokio::test]
async fn test_slow_upstream_is_gateway_timeout() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&upstream)
        .await;

    let app = app(&upstream, Duration::from_millis(200), 1024);
    let response = app
        .oneshot(Request::get("/pricing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["code"], "UPSTREAM_TIMEOUT");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let upstream = MockServer::start().await;
    let app = app(&upstream, Duration::from_secs(5), 16);
    let response = app
        .oneshot(
            Request::post("/api/upload")
                .body(Body::from(vec![b'x'; 64]))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(upstream.received_requests().await.unwrap().is_empty());
}
