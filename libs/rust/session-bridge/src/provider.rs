//! Identity provider boundary.
//!
//! The provider issues and refreshes tokens on its own; this crate only asks
//! whether a session exists and watches a `loading`/`user` snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Signed-in user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider user id
    pub id: String,
    /// Primary email, when the provider exposes one
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// Creates a user with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

/// Live provider session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session owner
    pub user: User,
    /// Access token expiry, when known
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a session with no known expiry.
    #[must_use]
    pub const fn for_user(user: User) -> Self {
        Self {
            user,
            expires_at: None,
        }
    }
}

/// What the route gate sees of the provider at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    /// The provider has not answered yet
    pub loading: bool,
    /// Signed-in user, once loaded
    pub user: Option<User>,
}

impl AuthSnapshot {
    /// Snapshot before the provider has answered.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            loading: true,
            user: None,
        }
    }

    /// Loaded snapshot with a signed-in user.
    #[must_use]
    pub const fn signed_in(user: User) -> Self {
        Self {
            loading: false,
            user: Some(user),
        }
    }

    /// Loaded snapshot with nobody signed in.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            loading: false,
            user: None,
        }
    }
}

/// Provider-side auth state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A sign-in completed
    SignedIn(Session),
    /// Tokens were refreshed for a still-valid session
    TokenRefreshed(Session),
    /// The user signed out or the session was revoked
    SignedOut,
}

/// Session lookup against the identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the current session, `None` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the provider cannot answer or
    /// rejects the stored session.
    async fn get_session(&self) -> Result<Option<Session>, ProviderError>;
}
