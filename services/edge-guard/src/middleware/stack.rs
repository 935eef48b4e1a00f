//! Service Stack Builder
//!
//! Composes middleware layers in the correct order.

use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;

use crate::middleware::redirect_guard::RedirectGuardLayer;
use crate::middleware::tracing::TracingLayer;

/// Wraps every route of `router` in the middleware stack.
///
/// Layer order (outermost to innermost):
/// 1. Tracing - correlation id and one span per request
/// 2. Timeout - answers 408 when the request exceeds `request_timeout`
/// 3. Redirect guard - answers redirects before any handler runs
/// 4. Router - health, metrics and the upstream proxy
pub fn apply_middleware(
    router: Router,
    service_name: &str,
    guard: RedirectGuardLayer,
    request_timeout: Duration,
) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TracingLayer::new(service_name))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(guard),
    )
}
