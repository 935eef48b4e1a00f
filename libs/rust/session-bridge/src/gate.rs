//! Client route gate: the authoritative post-mount check.
//!
//! The edge guard decides from cookies, which may lag the provider by up to
//! one mirror period. The gate re-checks against the provider's live session
//! once the page is mounted and issues a client-side navigation when the two
//! disagree.
//!
//! Navigation fires only on a transition into a redirecting state, so
//! re-observing the same snapshot never navigates twice. Every gate
//! navigation carries the redirect marker: when the gate overrides a stale
//! cookie, the edge would otherwise bounce the navigation straight back.

use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::protocol::{ERROR_PARAM, RouteClass, RoutePolicy, append_param, with_marker};
use crate::provider::{AuthSnapshot, IdentityProvider};

/// Client-side navigation.
pub trait Navigator: Send + Sync {
    /// Navigates to `target` (path plus query).
    fn navigate(&self, target: &str);
}

/// Gate state for the mounted area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Provider still loading
    Checking,
    /// Protected area, nobody signed in
    UnauthenticatedOnProtected,
    /// Auth page, somebody signed in
    AuthenticatedOnAuthRoute,
    /// Nothing to do
    Settled,
}

/// What the mounted area should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// Minimal loading placeholder
    Placeholder,
    /// Nothing; a navigation is in flight
    Nothing,
    /// The protected content
    Children,
}

impl GateState {
    /// View for this state.
    #[must_use]
    pub const fn view(self) -> GateView {
        match self {
            Self::Checking => GateView::Placeholder,
            Self::UnauthenticatedOnProtected | Self::AuthenticatedOnAuthRoute => GateView::Nothing,
            Self::Settled => GateView::Children,
        }
    }

    /// Derives the state of an area of class `class` from a snapshot.
    #[must_use]
    pub const fn derive(class: RouteClass, snapshot: &AuthSnapshot) -> Self {
        if snapshot.loading {
            return Self::Checking;
        }
        match (class, snapshot.user.is_some()) {
            (RouteClass::Protected, false) => Self::UnauthenticatedOnProtected,
            (RouteClass::Auth, true) => Self::AuthenticatedOnAuthRoute,
            _ => Self::Settled,
        }
    }
}

/// Per-mount guard for one area.
pub struct RouteGate<N> {
    policy: RoutePolicy,
    class: RouteClass,
    navigator: N,
    state: Option<GateState>,
}

impl<N: Navigator> RouteGate<N> {
    /// Creates a gate for the area mounted at `path`.
    pub fn new(policy: RoutePolicy, path: &str, navigator: N) -> Self {
        let class = policy.classify(path);
        Self::for_class(policy, class, navigator)
    }

    /// Creates a gate for an explicitly classified area.
    pub const fn for_class(policy: RoutePolicy, class: RouteClass, navigator: N) -> Self {
        Self {
            policy,
            class,
            navigator,
            state: None,
        }
    }

    /// Area class.
    pub const fn class(&self) -> RouteClass {
        self.class
    }

    /// Last observed state, `None` before the first observation.
    pub const fn state(&self) -> Option<GateState> {
        self.state
    }

    /// Navigator, for inspection.
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Applies a provider snapshot and returns what to render.
    pub fn observe(&mut self, snapshot: &AuthSnapshot) -> GateView {
        let next = GateState::derive(self.class, snapshot);
        self.transition(next, None)
    }

    /// Asks the provider for the live session and settles on it.
    ///
    /// Passes through [`GateState::Checking`] while the lookup is in flight.
    /// A provider error counts as signed out; on a protected area the
    /// navigation to the auth entry carries the error code.
    pub async fn resolve<P>(&mut self, provider: &P) -> GateView
    where
        P: IdentityProvider + ?Sized,
    {
        self.observe(&AuthSnapshot::loading());
        match provider.get_session().await {
            Ok(Some(session)) => self.observe(&AuthSnapshot::signed_in(session.user)),
            Ok(None) => self.observe(&AuthSnapshot::signed_out()),
            Err(e) => {
                warn!(error = %e, code = e.code(), "Session lookup failed, treating as signed out");
                let next = GateState::derive(self.class, &AuthSnapshot::signed_out());
                self.transition(next, Some(&e))
            }
        }
    }

    fn transition(&mut self, next: GateState, error: Option<&ProviderError>) -> GateView {
        let previous = self.state.replace(next);
        if previous == Some(next) {
            return next.view();
        }
        debug!(class = %self.class, from = ?previous, to = ?next, "Gate state changed");

        let target = match next {
            GateState::UnauthenticatedOnProtected => {
                let entry = self.policy.auth_entry();
                Some(match error {
                    Some(e) => with_marker(&append_param(entry, ERROR_PARAM, e.code())),
                    None => with_marker(entry),
                })
            }
            GateState::AuthenticatedOnAuthRoute => {
                Some(with_marker(self.policy.protected_landing()))
            }
            GateState::Checking | GateState::Settled => None,
        };
        if let Some(target) = target {
            info!(class = %self.class, target = %target, "Gate redirecting");
            self.navigator.navigate(&target);
        }
        next.view()
    }
}
