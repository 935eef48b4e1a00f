//! Redirect guard Tower layer.
//!
//! Runs [`RedirectGuard::evaluate`] on every request. Redirects are answered
//! here with `307 Temporary Redirect`; everything else reaches the inner
//! service, with the redirect marker removed from the URI when present.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{Either, Ready, ready};
use http::header::{CACHE_CONTROL, LOCATION};
use http::uri::PathAndQuery;
use http::{HeaderValue, Request, Response, StatusCode, Uri};
use tower::{Layer, Service};
use tracing::warn;

use crate::guard::{GuardOutcome, RedirectGuard};
use crate::observability::{GuardMetrics, log_evaluation};

/// Layer that applies the redirect guard
#[derive(Clone)]
pub struct RedirectGuardLayer {
    guard: Arc<RedirectGuard>,
    metrics: Option<GuardMetrics>,
}

impl RedirectGuardLayer {
    /// Creates a layer without metrics
    #[must_use]
    pub fn new(guard: RedirectGuard) -> Self {
        Self {
            guard: Arc::new(guard),
            metrics: None,
        }
    }

    /// Records every decision in `metrics`
    #[must_use]
    pub fn with_metrics(mut self, metrics: GuardMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl<S> Layer<S> for RedirectGuardLayer {
    type Service = RedirectGuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RedirectGuardService {
            inner,
            guard: Arc::clone(&self.guard),
            metrics: self.metrics.clone(),
        }
    }
}

/// Service produced by [`RedirectGuardLayer`]
#[derive(Clone)]
pub struct RedirectGuardService<S> {
    inner: S,
    guard: Arc<RedirectGuard>,
    metrics: Option<GuardMetrics>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RedirectGuardService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: Default,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Either<S::Future, Ready<Result<Response<ResBody>, S::Error>>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let evaluation = self.guard.evaluate(req.uri(), req.headers());
        log_evaluation(req.uri().path(), &evaluation);
        if let Some(metrics) = &self.metrics {
            metrics.record(&evaluation);
        }

        match evaluation.outcome {
            GuardOutcome::Allow => Either::Left(self.inner.call(req)),
            GuardOutcome::ConsumeMarker { path_and_query } => {
                match rewrite_path_and_query(req.uri(), &path_and_query) {
                    Ok(uri) => *req.uri_mut() = uri,
                    Err(e) => warn!(error = %e, "Could not strip redirect marker, forwarding as is"),
                }
                Either::Left(self.inner.call(req))
            }
            GuardOutcome::Redirect { location } => Either::Right(ready(Ok(redirect(location)))),
        }
    }
}

fn rewrite_path_and_query(uri: &Uri, path_and_query: &str) -> Result<Uri, http::Error> {
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}

fn redirect<B: Default>(location: HeaderValue) -> Response<B> {
    let mut response = Response::new(B::default());
    *response.status_mut() = StatusCode::TEMPORARY_REDIRECT;
    response.headers_mut().insert(LOCATION, location);
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use http::header::COOKIE;
    use session_bridge::RoutePolicy;
    use tower::{ServiceBuilder, ServiceExt, service_fn};

    use super::*;
    use crate::guard::ProviderCookiePolicy;

    fn layer() -> RedirectGuardLayer {
        RedirectGuardLayer::new(
            RedirectGuard::new(RoutePolicy::default(), ProviderCookiePolicy::default()).unwrap(),
        )
    }

    /// Echoes the URI it received in the body.
    async fn echo(req: Request<String>) -> Result<Response<String>, Infallible> {
        Ok(Response::new(req.uri().to_string()))
    }

    #[tokio::test]
    async fn test_redirect_short_circuits() {
        let svc = ServiceBuilder::new().layer(layer()).service(service_fn(echo));
        let response = svc
            .oneshot(Request::get("/dashboard").body(String::new()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/login?redirected=true");
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_redirect_is_ready_without_polling_inner() {
        let mut svc = layer().layer(service_fn(echo));
        let mut future = tokio_test::task::spawn(
            svc.call(Request::get("/chat/42").body(String::new()).unwrap()),
        );
        let response = tokio_test::assert_ready_ok!(future.poll());
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn test_marker_is_stripped_before_inner_service() {
        let svc = ServiceBuilder::new().layer(layer()).service(service_fn(echo));
        let response = svc
            .oneshot(
                Request::get("/dashboard?tab=2&redirected=true")
                    .body(String::new())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "/dashboard?tab=2");
    }

    #[tokio::test]
    async fn test_authenticated_protected_passes_through() {
        let svc = ServiceBuilder::new().layer(layer()).service(service_fn(echo));
        let response = svc
            .oneshot(
                Request::get("/chat")
                    .header(COOKIE, "client-auth-status=authenticated")
                    .body(String::new())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "/chat");
    }

    #[tokio::test]
    async fn test_metrics_are_recorded() {
        let metrics = GuardMetrics::new().unwrap();
        let svc = ServiceBuilder::new()
            .layer(layer().with_metrics(metrics.clone()))
            .service(service_fn(echo));
        svc.oneshot(Request::get("/login?redirected=true").body(String::new()).unwrap())
            .await
            .unwrap();
        assert_eq!(metrics.marker_consumed.get(), 1);
    }
}
