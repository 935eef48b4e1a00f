//! Error types for the client side of the bridge.
//!
//! None of these errors cross the public surface of the beacon or the mirror:
//! both recover locally and treat a failed read as "absent". They exist so
//! storage and cookie backends can report what went wrong to the log.

use thiserror::Error;

/// Client key-value storage failures.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StorageError {
    /// Storage is disabled or not reachable in this context
    #[error("Storage unavailable")]
    Unavailable,

    /// Backing file could not be read or written
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file exists but is not a valid entry map
    #[error("Storage contents corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Cookie jar failures.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CookieError {
    /// The jar refused the write
    #[error("Cookie jar unavailable")]
    Unavailable,

    /// Cookie name or value contains bytes the wire format cannot carry
    #[error("Invalid cookie: {0}")]
    Invalid(String),
}

/// Identity provider failures as seen by the route gate.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider could not be reached
    #[error("Identity provider unreachable: {0}")]
    Network(String),

    /// The provider answered but rejected the stored session
    #[error("Session rejected: {0}")]
    InvalidSession(String),

    /// The provider reported itself unavailable
    #[error("Session lookup unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Machine-readable code carried in the `error` query parameter.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "provider_network",
            Self::InvalidSession(_) => "session_invalid",
            Self::Unavailable(_) => "session_unavailable",
        }
    }
}
