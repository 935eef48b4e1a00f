//! Harness for driving a browser navigation through the edge guard.
//!
//! A [`Browser`] sends requests carrying whatever the client context's
//! cookie jar holds, follows at most a fixed number of redirects, and
//! reports where the navigation rendered.

use std::convert::Infallible;

use edge_guard::{ConfigError, ProviderCookiePolicy, RedirectGuard, RedirectGuardLayer};
use http::header::{COOKIE, LOCATION};
use http::{Request, Response, StatusCode};
use session_bridge::RoutePolicy;
use test_utils::fixtures::ClientContext;
use tower::util::BoxCloneService;
use tower::{ServiceBuilder, ServiceExt, service_fn};

/// Redirects followed before a navigation counts as looping.
pub const MAX_REDIRECTS: usize = 5;

/// How a navigation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Path and query the application rendered
    pub rendered: String,
    /// Every redirect location followed, in order
    pub redirects: Vec<String>,
}

/// Why a navigation did not render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseError {
    /// Still redirecting after [`MAX_REDIRECTS`] hops; holds every location
    Loop(Vec<String>),
    /// A target or redirect location is not a usable request URI
    InvalidTarget(String),
}

/// The edge guard in front of an application that renders its own URI.
pub struct Browser {
    edge: BoxCloneService<Request<String>, Response<String>, Infallible>,
}

impl Browser {
    /// Edge with the default route policy and cookie recognition.
    ///
    /// # Errors
    ///
    /// Returns an error when the guard cannot be built.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self::with_guard(RedirectGuard::new(
            RoutePolicy::default(),
            ProviderCookiePolicy::default(),
        )?))
    }

    /// Edge around a prepared guard.
    #[must_use]
    pub fn with_guard(guard: RedirectGuard) -> Self {
        let app = service_fn(|req: Request<String>| async move {
            Ok::<_, Infallible>(Response::new(req.uri().to_string()))
        });
        let edge = ServiceBuilder::new()
            .layer(RedirectGuardLayer::new(guard))
            .service(app);
        Self {
            edge: BoxCloneService::new(edge),
        }
    }

    /// Navigates to `target` with the cookies currently in `client`'s jar.
    ///
    /// # Errors
    ///
    /// Returns [`BrowseError::Loop`] after [`MAX_REDIRECTS`] redirects and
    /// [`BrowseError::InvalidTarget`] for a URI the request cannot carry.
    pub async fn visit(
        &self,
        client: &ClientContext,
        target: &str,
    ) -> Result<Navigation, BrowseError> {
        self.visit_with(|| client.cookie_header(), target).await
    }

    /// Navigates to `target`, asking `cookies` for the `Cookie` header
    /// before every hop.
    ///
    /// # Errors
    ///
    /// Same as [`Browser::visit`].
    pub async fn visit_with(
        &self,
        cookies: impl Fn() -> Option<String>,
        target: &str,
    ) -> Result<Navigation, BrowseError> {
        let mut redirects = Vec::new();
        let mut next = target.to_string();
        loop {
            let mut request = Request::get(next.as_str());
            if let Some(cookies) = cookies() {
                request = request.header(COOKIE, cookies);
            }
            let request = request
                .body(String::new())
                .map_err(|_| BrowseError::InvalidTarget(next.clone()))?;
            let response = self
                .edge
                .clone()
                .oneshot(request)
                .await
                .unwrap_or_else(|never| match never {});

            if response.status() != StatusCode::TEMPORARY_REDIRECT {
                return Ok(Navigation {
                    rendered: response.into_body(),
                    redirects,
                });
            }
            if redirects.len() == MAX_REDIRECTS {
                return Err(BrowseError::Loop(redirects));
            }
            next = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| BrowseError::InvalidTarget(next.clone()))?
                .to_string();
            redirects.push(next.clone());
        }
    }
}

