//! Upstream forwarding.
//!
//! Requests the guard lets through are replayed against the upstream
//! application. Bodies are buffered up to a fixed limit. Upstream redirects
//! are passed back to the client untouched.

use std::time::Duration;

use axum::body::{Body, to_bytes};
use http::header::{self, HeaderName};
use http::{HeaderMap, Request, Response, Uri};
use tracing::debug;
use url::Url;

use crate::error::EdgeGuardError;

/// Headers that describe one hop and must not be forwarded.
static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Forwards requests to a fixed upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamProxy {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
    max_body_bytes: usize,
}

impl UpstreamProxy {
    /// Creates a proxy with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(base: Url, timeout: Duration, max_body_bytes: usize) -> Result<Self, EdgeGuardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            base,
            timeout,
            max_body_bytes,
        })
    }

    /// Upstream base URL.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves the upstream URL for an incoming request URI.
    #[must_use]
    pub fn target_url(&self, uri: &Uri) -> Url {
        let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
        let mut target = self.base.clone();
        let base_path = target.path().trim_end_matches('/').to_string();
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };
        target.set_path(&format!("{base_path}{path}"));
        target.set_query(query);
        target
    }

    /// Forwards a request and returns the upstream response.
    ///
    /// # Errors
    ///
    /// Returns [`EdgeGuardError::BodyRejected`] when the body exceeds the
    /// limit, [`EdgeGuardError::Timeout`] when the upstream is too slow and
    /// [`EdgeGuardError::Upstream`] for any other transport failure.
    pub async fn forward(&self, req: Request<Body>) -> Result<Response<Body>, EdgeGuardError> {
        let (parts, body) = req.into_parts();
        let url = self.target_url(&parts.uri);
        let body = to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| EdgeGuardError::BodyRejected {
                reason: e.to_string(),
            })?;

        let mut headers = filter_headers(&parts.headers);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);
        if let Some(host) = parts.headers.get(header::HOST) {
            headers.insert(HeaderName::from_static("x-forwarded-host"), host.clone());
        }

        debug!(method = %parts.method, url = %url, "Forwarding upstream");
        let upstream = self
            .client
            .request(parts.method, url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = upstream.status();
        let mut response_headers = filter_headers(upstream.headers());
        response_headers.remove(header::CONTENT_LENGTH);
        let bytes = upstream.bytes().await.map_err(|e| self.classify(e))?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }

    fn classify(&self, err: reqwest::Error) -> EdgeGuardError {
        if err.is_timeout() {
            EdgeGuardError::Timeout {
                duration: self.timeout,
            }
        } else {
            EdgeGuardError::Upstream(err)
        }
    }
}

fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = headers.clone();
    for name in &HOP_BY_HOP {
        filtered.remove(name);
    }
    filtered.remove(HeaderName::from_static("keep-alive"));
    filtered
}
