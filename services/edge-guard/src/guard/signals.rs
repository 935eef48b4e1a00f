//! Request-visible auth signals.

use axum_extra::extract::cookie::CookieJar;
use http::HeaderMap;
use session_bridge::protocol::{AUTH_COOKIE_NAME, AUTHENTICATED};

/// Substrings that identify a provider session cookie.
const PROVIDER_MARKERS: &[&str] = &["supabase", "sb-"];

/// Development tooling cookies that happen to match the markers.
const EXCLUDED_ARTIFACTS: &[&str] = &["hmr", "webpack", "__next"];

/// How provider-issued session cookies are recognized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderCookiePolicy {
    /// Name contains a provider marker and `token`, and no tooling artifact.
    #[default]
    Heuristic,
    /// Name equals one of these, or is a numbered chunk `<name>.<n>` of one.
    Exact(Vec<String>),
}

impl ProviderCookiePolicy {
    /// Pattern-based recognition.
    #[must_use]
    pub const fn heuristic() -> Self {
        Self::Heuristic
    }

    /// Recognition by exact cookie name.
    pub fn exact<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exact(names.into_iter().map(Into::into).collect())
    }

    /// Returns true when the cookie is a provider session cookie. Empty
    /// values never count.
    #[must_use]
    pub fn matches(&self, name: &str, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        match self {
            Self::Heuristic => {
                let name = name.to_ascii_lowercase();
                PROVIDER_MARKERS.iter().any(|m| name.contains(m))
                    && name.contains("token")
                    && !EXCLUDED_ARTIFACTS.iter().any(|a| name.contains(a))
            }
            Self::Exact(names) => names.iter().any(|n| is_name_or_chunk(name, n)),
        }
    }
}

fn is_name_or_chunk(name: &str, expected: &str) -> bool {
    name == expected
        || name
            .strip_prefix(expected)
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Signals read from one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthSignals {
    /// A provider session cookie is present
    pub provider_cookie: bool,
    /// The mirrored auth cookie says `authenticated`
    pub mirror_cookie: bool,
}

impl AuthSignals {
    /// Reads the signals from request headers.
    ///
    /// Cookie headers that are not valid UTF-8 and pairs that do not parse
    /// are skipped, so a garbled header reads as absent.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, policy: &ProviderCookiePolicy) -> Self {
        let jar = CookieJar::from_headers(headers);
        let provider_cookie = jar.iter().any(|c| policy.matches(c.name(), c.value()));
        let mirror_cookie = jar
            .get(AUTH_COOKIE_NAME)
            .is_some_and(|c| c.value() == AUTHENTICATED);
        Self {
            provider_cookie,
            mirror_cookie,
        }
    }

    /// Provider signal, else mirrored cookie, else signed out.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        self.provider_cookie || self.mirror_cookie
    }
}
