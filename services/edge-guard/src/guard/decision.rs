//! Routing decision.
//!
//! | authenticated | class     | action                    |
//! |---------------|-----------|---------------------------|
//! | yes           | auth      | redirect to landing       |
//! | no            | protected | redirect to auth entry    |
//! | any other     |           | allow                     |
//!
//! A request carrying the redirect marker skips the table entirely: the
//! marker is stripped and the request goes through.

use http::{HeaderMap, HeaderValue, Uri};
use session_bridge::protocol::{has_marker, strip_marker, with_marker};
use session_bridge::{RouteClass, RoutePolicy};

use crate::config::ConfigError;
use crate::guard::signals::{AuthSignals, ProviderCookiePolicy};

/// What the decision table says to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Let the request through
    Allow,
    /// Send the user to the auth entry
    RedirectToAuthEntry,
    /// Send the user to the protected landing
    RedirectToLanding,
}

impl Action {
    /// Metric label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::RedirectToAuthEntry => "redirect_auth_entry",
            Self::RedirectToLanding => "redirect_landing",
        }
    }
}

/// The decision table.
#[must_use]
pub const fn decide(authenticated: bool, class: RouteClass) -> Action {
    match (authenticated, class) {
        (true, RouteClass::Auth) => Action::RedirectToLanding,
        (false, RouteClass::Protected) => Action::RedirectToAuthEntry,
        _ => Action::Allow,
    }
}

/// What the middleware does with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Forward unchanged
    Allow,
    /// Forward with the marker removed from the query
    ConsumeMarker {
        /// Rewritten path and query
        path_and_query: String,
    },
    /// Answer with a temporary redirect
    Redirect {
        /// `Location` header, marker included
        location: HeaderValue,
    },
}

/// Result of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// What to do
    pub outcome: GuardOutcome,
    /// Path classification
    pub class: RouteClass,
    /// Signals read, `None` when the marker short-circuited the check
    pub signals: Option<AuthSignals>,
}

impl Evaluation {
    /// Metric label for the outcome.
    #[must_use]
    pub fn action_label(&self) -> &'static str {
        match &self.outcome {
            GuardOutcome::ConsumeMarker { .. } => "consume_marker",
            GuardOutcome::Allow => Action::Allow.as_str(),
            GuardOutcome::Redirect { .. } => {
                let authenticated = self.signals.is_some_and(AuthSignals::is_authenticated);
                decide(authenticated, self.class).as_str()
            }
        }
    }
}

/// Evaluates requests against a route policy.
#[derive(Debug, Clone)]
pub struct RedirectGuard {
    policy: RoutePolicy,
    cookies: ProviderCookiePolicy,
    to_auth_entry: HeaderValue,
    to_landing: HeaderValue,
}

impl RedirectGuard {
    /// Creates a guard. Both redirect locations are built once here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] when a redirect target cannot be
    /// sent as a header value.
    pub fn new(policy: RoutePolicy, cookies: ProviderCookiePolicy) -> Result<Self, ConfigError> {
        let to_auth_entry = location("AUTH_ENTRY_PATH", policy.auth_entry())?;
        let to_landing = location("PROTECTED_LANDING_PATH", policy.protected_landing())?;
        Ok(Self {
            policy,
            cookies,
            to_auth_entry,
            to_landing,
        })
    }

    /// Route policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Evaluates a request.
    #[must_use]
    pub fn evaluate(&self, uri: &Uri, headers: &HeaderMap) -> Evaluation {
        let path = uri.path();
        let class = self.policy.classify(path);

        if has_marker(uri.query()) {
            let path_and_query = match uri.query().and_then(strip_marker) {
                Some(query) => format!("{path}?{query}"),
                None => path.to_string(),
            };
            return Evaluation {
                outcome: GuardOutcome::ConsumeMarker { path_and_query },
                class,
                signals: None,
            };
        }

        let signals = AuthSignals::from_headers(headers, &self.cookies);
        let outcome = match decide(signals.is_authenticated(), class) {
            Action::Allow => GuardOutcome::Allow,
            Action::RedirectToAuthEntry => GuardOutcome::Redirect {
                location: self.to_auth_entry.clone(),
            },
            Action::RedirectToLanding => GuardOutcome::Redirect {
                location: self.to_landing.clone(),
            },
        };
        Evaluation {
            outcome,
            class,
            signals: Some(signals),
        }
    }
}

fn location(field: &str, target: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::try_from(with_marker(target)).map_err(|e| ConfigError::InvalidPath {
        field: field.to_string(),
        reason: e.to_string(),
    })
}
