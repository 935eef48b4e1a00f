//! Test fixtures with sample data.

use std::sync::Arc;
use std::time::Duration;

use session_bridge::{
    CookieMirror, ManualClock, MemoryCookieJar, MemoryStore, Session, SessionBeacon, User,
};

/// Fixed starting instant for manual clocks (2023-11-14T22:13:20Z).
pub const T0_MILLIS: i64 = 1_700_000_000_000;

/// A provider session cookie as issued for a project named `project`.
pub const PROVIDER_COOKIE: &str = "sb-project-auth-token=base64-eyJhY2Nlc3NfdG9rZW4iOiJ4In0";

/// The mirrored cookie in its signed-in state.
pub const MIRROR_COOKIE: &str = "client-auth-status=authenticated";

/// Sample user.
#[must_use]
pub fn alice() -> User {
    User {
        id: "8f14e45f-ceea-467f-a0e6-1b8f2d9e5c11".to_string(),
        email: Some("alice@example.com".to_string()),
    }
}

/// Live session for [`alice`].
#[must_use]
pub fn alice_session() -> Session {
    Session::for_user(alice())
}

/// Beacon type used by the fixtures.
pub type TestBeacon = SessionBeacon<MemoryStore, ManualClock>;

/// Client runtime assembled around in-memory storage, a manual clock and an
/// in-memory cookie jar, the way one browser tab would hold it.
#[derive(Clone)]
pub struct ClientContext {
    /// Durable storage shared by every tab of the origin
    pub store: MemoryStore,
    /// Wall clock
    pub clock: ManualClock,
    /// This tab's beacon
    pub beacon: Arc<TestBeacon>,
    /// Cookie jar of the origin
    pub jar: Arc<MemoryCookieJar>,
}

impl ClientContext {
    /// Fresh context at [`T0_MILLIS`].
    #[must_use]
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let clock = ManualClock::new(T0_MILLIS);
        let beacon = Arc::new(SessionBeacon::with_clock(store.clone(), clock.clone()));
        Self {
            store,
            clock,
            beacon,
            jar: Arc::new(MemoryCookieJar::new()),
        }
    }

    /// A second tab: same storage, clock and jar, its own beacon handle.
    #[must_use]
    pub fn other_tab(&self) -> Self {
        Self {
            beacon: Arc::new(SessionBeacon::with_clock(
                self.store.clone(),
                self.clock.clone(),
            )),
            ..self.clone()
        }
    }

    /// Mirror for this context.
    #[must_use]
    pub fn mirror(&self) -> CookieMirror<MemoryStore, ManualClock, MemoryCookieJar> {
        CookieMirror::new(Arc::clone(&self.beacon), Arc::clone(&self.jar))
    }

    /// Advances the wall clock.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// The `Cookie` header a navigation from this context would carry.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        self.jar.header_value()
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::new()
    }
}
