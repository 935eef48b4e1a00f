//! Cross-boundary authentication state bridge.
//!
//! The client runtime and the edge routing layer never share memory. They
//! agree on "is this user signed in?" through two request-visible replicas:
//!
//! - the **beacon**, a pair of entries in client key-value storage with a
//!   24 hour staleness bound ([`beacon`]);
//! - the **auth cookie**, a short-lived projection of the beacon written by
//!   the [`mirror`] so the edge can read it on the next navigation.
//!
//! The [`gate`] runs after mount against the identity provider's live
//! session and has the final word. [`protocol`] holds the wire constants,
//! route classification and redirect marker both sides must agree on.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod beacon;
pub mod clock;
pub mod cookie_jar;
pub mod error;
pub mod gate;
pub mod mirror;
pub mod protocol;
pub mod provider;
pub mod storage;
pub mod sync;

pub use beacon::{BeaconState, BeaconStatus, SessionBeacon};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cookie_jar::{CookieStore, MemoryCookieJar};
pub use error::{CookieError, ProviderError, StorageError};
pub use gate::{GateState, GateView, Navigator, RouteGate};
pub use mirror::{CookieMirror, MirrorHandle, MirrorWrite};
pub use protocol::{RouteClass, RoutePolicy};
pub use provider::{AuthEvent, AuthSnapshot, IdentityProvider, Session, User};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageEvent};
pub use sync::SessionSync;
