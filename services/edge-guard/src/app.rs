//! Router assembly.
//!
//! `/healthz` and `/metrics` are answered locally; every other path is
//! forwarded upstream. The guard wraps all of it, which is harmless for the
//! two local routes since they classify as public.

use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::warn;

use crate::config::Config;
use crate::error::EdgeGuardError;
use crate::guard::RedirectGuard;
use crate::middleware::{CorrelationId, RedirectGuardLayer, apply_middleware};
use crate::observability::GuardMetrics;
use crate::proxy::UpstreamProxy;

/// Service name used in spans and logs.
pub const SERVICE_NAME: &str = "edge-guard-service";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Upstream forwarder
    pub proxy: UpstreamProxy,
    /// Decision metrics
    pub metrics: GuardMetrics,
}

/// Builds the full application from configuration.
///
/// # Errors
///
/// Returns an error when the guard, metrics or HTTP client cannot be built.
pub fn build_app(config: &Config) -> Result<Router, EdgeGuardError> {
    let guard = RedirectGuard::new(config.route_policy(), config.cookie_policy())?;
    let state = AppState {
        proxy: UpstreamProxy::new(
            config.upstream_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
            config.max_body_bytes,
        )?,
        metrics: GuardMetrics::new()?,
    };
    Ok(build_router(
        state,
        guard,
        Duration::from_secs(config.request_timeout_secs),
    ))
}

/// Builds the router around prepared state.
pub fn build_router(state: AppState, guard: RedirectGuard, request_timeout: Duration) -> Router {
    let layer = RedirectGuardLayer::new(guard).with_metrics(state.metrics.clone());
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .fallback(forward_upstream)
        .with_state(state);
    apply_middleware(router, SERVICE_NAME, layer, request_timeout)
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(text) => ([(CONTENT_TYPE, "text/plain; version=0.0.4")], text).into_response(),
        Err(e) => EdgeGuardError::from(e).to_response(uuid::Uuid::new_v4()),
    }
}

async fn forward_upstream(State(state): State<AppState>, req: Request<Body>) -> Response {
    let correlation_id = req
        .extensions()
        .get::<CorrelationId>()
        .copied()
        .unwrap_or_default();
    match state.proxy.forward(req).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, code = e.code().as_str(), "Upstream forward failed");
            e.to_response(correlation_id.0)
        }
    }
}
