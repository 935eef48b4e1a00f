//! Edge Guard Service - request-time redirects from auth cookies.
//!
//! Sits in front of a web application and routes navigations before any
//! page renders: signed-out users are sent from protected areas to the auth
//! entry, signed-in users from auth pages to the protected landing. The
//! only inputs are the provider's session cookies and the mirrored
//! `client-auth-status` cookie written by the client runtime in
//! `session-bridge`. Allowed requests are forwarded to the upstream.

pub mod app;
pub mod config;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod observability;
pub mod proxy;
pub mod shutdown;

pub use app::{AppState, SERVICE_NAME, build_app, build_router};
pub use config::{Config, ConfigError, ProviderCookieMode};
pub use error::{EdgeGuardError, ErrorCode, ErrorResponse};
pub use guard::{AuthSignals, GuardOutcome, ProviderCookiePolicy, RedirectGuard};
pub use middleware::RedirectGuardLayer;
pub use observability::GuardMetrics;
pub use proxy::UpstreamProxy;
