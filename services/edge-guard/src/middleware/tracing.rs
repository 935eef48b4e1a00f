//! Request Tracing Tower Layer
//!
//! Opens one span per request carrying a correlation id. The id is stored
//! in the request extensions for handlers and echoed back in the
//! `x-correlation-id` response header.

use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use futures::future::BoxFuture;
use http::{HeaderName, HeaderValue, Request, Response};
use tower::{Layer, Service};
use tracing::{Instrument, info_span};
use uuid::Uuid;

/// Response header carrying the correlation id.
pub static CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// Per-request correlation id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    /// Generates a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Tracing layer for Tower
#[derive(Clone)]
pub struct TracingLayer {
    service_name: Arc<str>,
}

impl TracingLayer {
    /// Creates a new tracing layer
    pub fn new(service_name: impl Into<Arc<str>>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService {
            inner,
            service_name: Arc::clone(&self.service_name),
        }
    }
}

/// Tracing service wrapper
#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
    service_name: Arc<str>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for TracingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Error: fmt::Display + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let correlation_id = CorrelationId::new();
        req.extensions_mut().insert(correlation_id);

        let span = info_span!(
            "request",
            service = %self.service_name,
            correlation_id = %correlation_id,
            method = %req.method(),
            path = %req.uri().path(),
        );

        // Drive the clone that was polled ready.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(
            async move {
                let started = Instant::now();
                let result = inner.call(req).await;
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

                match result {
                    Ok(mut response) => {
                        tracing::info!(
                            status = response.status().as_u16(),
                            elapsed_ms,
                            "Request completed"
                        );
                        if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
                            response
                                .headers_mut()
                                .insert(CORRELATION_ID_HEADER.clone(), value);
                        }
                        Ok(response)
                    }
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            error_type = std::any::type_name::<S::Error>(),
                            elapsed_ms,
                            "Request failed"
                        );
                        Err(err)
                    }
                }
            }
            .instrument(span),
        )
    }
}
