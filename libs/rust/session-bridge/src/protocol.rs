//! Wire protocol shared by the client runtime and the edge guard.
//!
//! Everything in this module must match byte for byte on both sides: cookie
//! and storage key names, the redirect marker, and the route prefixes used to
//! classify a path.

use std::fmt;
use std::time::Duration;

use url::form_urlencoded;

/// Name of the edge-visible cookie mirrored from the beacon.
pub const AUTH_COOKIE_NAME: &str = "client-auth-status";

/// The only non-absent value of the beacon status and the auth cookie.
pub const AUTHENTICATED: &str = "authenticated";

/// `Max-Age` of the auth cookie, in seconds.
pub const AUTH_COOKIE_MAX_AGE_SECS: i64 = 86_400;

/// Storage key holding the beacon status.
pub const STATUS_KEY: &str = "supabase-auth-status";

/// Storage key holding the epoch-millisecond assertion time.
pub const TIMESTAMP_KEY: &str = "supabase-auth-timestamp";

/// Staleness bound of an `authenticated` beacon.
pub const BEACON_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Query parameter attached to every guard-issued redirect.
pub const REDIRECT_MARKER_PARAM: &str = "redirected";

/// Value of the redirect marker.
pub const REDIRECT_MARKER_VALUE: &str = "true";

/// Query parameter carrying a provider error code to the auth entry page.
pub const ERROR_PARAM: &str = "error";

/// Classification of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    /// Sign-in and sign-up pages
    Auth,
    /// Pages that require a signed-in user
    Protected,
    /// Everything else, including API paths
    Public,
}

impl RouteClass {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth-route",
            Self::Protected => "protected-route",
            Self::Public => "public-route",
        }
    }
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route prefixes and redirect targets.
///
/// A prefix matches the path equal to it and every path below it, so
/// `/login` covers `/login` and `/login/magic` but not `/loginx`. Auth
/// prefixes are checked first; [`RouteClass::Public`] is the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    auth_prefixes: Vec<String>,
    protected_prefixes: Vec<String>,
    auth_entry: String,
    protected_landing: String,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::new(["/login", "/signup", "/auth"], ["/dashboard", "/chat"])
    }
}

impl RoutePolicy {
    /// Creates a policy with the given prefixes and the default targets
    /// (`/login` and `/dashboard`).
    pub fn new<A, P>(auth_prefixes: A, protected_prefixes: P) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Self {
            auth_prefixes: auth_prefixes.into_iter().map(normalize_prefix).collect(),
            protected_prefixes: protected_prefixes.into_iter().map(normalize_prefix).collect(),
            auth_entry: "/login".to_string(),
            protected_landing: "/dashboard".to_string(),
        }
    }

    /// Sets the path unauthenticated users are sent to.
    #[must_use]
    pub fn with_auth_entry(mut self, path: impl Into<String>) -> Self {
        self.auth_entry = path.into();
        self
    }

    /// Sets the path authenticated users are sent to from auth pages.
    #[must_use]
    pub fn with_protected_landing(mut self, path: impl Into<String>) -> Self {
        self.protected_landing = path.into();
        self
    }

    /// Auth entry path, without marker.
    #[must_use]
    pub fn auth_entry(&self) -> &str {
        &self.auth_entry
    }

    /// Protected landing path, without marker.
    #[must_use]
    pub fn protected_landing(&self) -> &str {
        &self.protected_landing
    }

    /// Classifies a path. Any query string or fragment is ignored.
    ///
    /// Prefixes match whole segments only, so `/loginx` and `/authorize` are
    /// public here, unlike under plain string prefix matching.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        if self.auth_prefixes.iter().any(|p| matches_prefix(path, p)) {
            RouteClass::Auth
        } else if self.protected_prefixes.iter().any(|p| matches_prefix(path, p)) {
            RouteClass::Protected
        } else {
            RouteClass::Public
        }
    }
}

fn normalize_prefix(prefix: impl AsRef<str>) -> String {
    prefix.as_ref().trim_end_matches('/').to_string()
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Returns true when a single `key=value` pair is the redirect marker.
fn is_marker_pair(pair: &str) -> bool {
    form_urlencoded::parse(pair.as_bytes())
        .next()
        .is_some_and(|(k, v)| k == REDIRECT_MARKER_PARAM && v == REDIRECT_MARKER_VALUE)
}

/// Returns true when the query string carries the redirect marker.
#[must_use]
pub fn has_marker(query: Option<&str>) -> bool {
    query.is_some_and(|q| q.split('&').any(is_marker_pair))
}

/// Removes every redirect marker pair from a query string.
///
/// The remaining pairs keep their original encoding and order. Returns
/// `None` when nothing is left.
#[must_use]
pub fn strip_marker(query: &str) -> Option<String> {
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_marker_pair(pair))
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join("&"))
    }
}

/// Appends a query parameter to a path or path-and-query target.
#[must_use]
pub fn append_param(target: &str, name: &str, value: &str) -> String {
    let (base, fragment) = match target.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (target, None),
    };
    let pair = form_urlencoded::Serializer::new(String::new())
        .append_pair(name, value)
        .finish();
    let separator = match base.find('?') {
        None => '?',
        Some(idx) if idx + 1 == base.len() || base.ends_with('&') => {
            return finish(format!("{base}{pair}"), fragment);
        }
        Some(_) => '&',
    };
    finish(format!("{base}{separator}{pair}"), fragment)
}

fn finish(mut target: String, fragment: Option<&str>) -> String {
    if let Some(fragment) = fragment {
        target.push('#');
        target.push_str(fragment);
    }
    target
}

/// Attaches the redirect marker to a redirect target.
#[must_use]
pub fn with_marker(target: &str) -> String {
    append_param(target, REDIRECT_MARKER_PARAM, REDIRECT_MARKER_VALUE)
}
