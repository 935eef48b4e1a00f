//! Session beacon: a client-persisted "signed in" hint with an expiry.
//!
//! The beacon is two scalar entries, [`STATUS_KEY`] and [`TIMESTAMP_KEY`].
//! Validity is re-derived on every read: an `authenticated` status older than
//! the TTL is cleared on the spot, and a fresh one is re-stamped. Storage
//! failures never escape; a failed read is an absent beacon and a failed
//! write is logged and dropped.

use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock, duration_millis};
use crate::protocol::{AUTHENTICATED, BEACON_TTL, STATUS_KEY, TIMESTAMP_KEY};
use crate::storage::KeyValueStore;

/// Beacon status as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaconStatus {
    /// A sign-in was asserted
    Authenticated,
    /// Nothing asserted, or the stored value is not recognized
    Absent,
}

/// Read-only view of the beacon, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconState {
    /// Stored status
    pub status: BeaconStatus,
    /// Stored assertion time, epoch milliseconds
    pub asserted_at: Option<i64>,
    /// Time left before the assertion goes stale; `None` when absent or stale
    pub expires_in: Option<Duration>,
}

/// Reads and writes the beacon entries in a [`KeyValueStore`].
#[derive(Debug)]
pub struct SessionBeacon<S, C = SystemClock> {
    store: S,
    clock: C,
    ttl: Duration,
}

impl<S: KeyValueStore> SessionBeacon<S, SystemClock> {
    /// Creates a beacon on the system clock with the standard 24 hour TTL.
    pub const fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> SessionBeacon<S, C> {
    /// Creates a beacon on a custom clock.
    pub const fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            ttl: BEACON_TTL,
        }
    }

    /// Overrides the staleness bound.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Underlying storage.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns true while a sign-in assertion is present and fresh.
    ///
    /// A fresh assertion is re-stamped with the current time, so the TTL
    /// counts from the last successful check. An expired assertion, or one
    /// whose timestamp is missing or garbled, is cleared before returning
    /// false.
    pub fn is_authenticated(&self) -> bool {
        let status = match self.store.get(STATUS_KEY) {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Beacon status unreadable, treating as absent");
                return false;
            }
        };
        if status.as_deref() != Some(AUTHENTICATED) {
            return false;
        }

        let asserted_at = match self.store.get(TIMESTAMP_KEY) {
            Ok(raw) => raw.and_then(|v| v.trim().parse::<i64>().ok()),
            Err(e) => {
                warn!(error = %e, "Beacon timestamp unreadable, treating as absent");
                return false;
            }
        };

        let now = self.clock.now_millis();
        match asserted_at {
            Some(at) if now.saturating_sub(at) < duration_millis(self.ttl) => {
                if let Err(e) = self.store.set(TIMESTAMP_KEY, &now.to_string()) {
                    warn!(error = %e, "Failed to refresh beacon timestamp");
                }
                true
            }
            _ => {
                debug!(asserted_at = ?asserted_at, "Beacon stale, clearing");
                self.clear();
                false
            }
        }
    }

    /// Records a sign-in at the current time.
    pub fn mark_authenticated(&self) {
        let now = self.clock.now_millis().to_string();
        // Timestamp first: a reader that sees the new status must also see
        // a fresh timestamp.
        if let Err(e) = self.store.set(TIMESTAMP_KEY, &now) {
            warn!(error = %e, "Failed to write beacon timestamp");
            return;
        }
        if let Err(e) = self.store.set(STATUS_KEY, AUTHENTICATED) {
            warn!(error = %e, "Failed to write beacon status");
        }
    }

    /// Removes both entries. Safe to call repeatedly.
    pub fn clear(&self) {
        for key in [STATUS_KEY, TIMESTAMP_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to clear beacon entry");
            }
        }
    }

    /// Reads the beacon without clearing anything.
    pub fn snapshot(&self) -> BeaconState {
        let status = match self.store.get(STATUS_KEY) {
            Ok(Some(v)) if v == AUTHENTICATED => BeaconStatus::Authenticated,
            _ => BeaconStatus::Absent,
        };
        let asserted_at = self
            .store
            .get(TIMESTAMP_KEY)
            .ok()
            .flatten()
            .and_then(|v| v.trim().parse::<i64>().ok());
        let expires_in = match (status, asserted_at) {
            (BeaconStatus::Authenticated, Some(at)) => {
                let left = duration_millis(self.ttl)
                    .saturating_sub(self.clock.now_millis().saturating_sub(at));
                u64::try_from(left)
                    .ok()
                    .filter(|ms| *ms > 0)
                    .map(Duration::from_millis)
            }
            _ => None,
        };
        BeaconState {
            status,
            asserted_at,
            expires_in,
        }
    }
}
