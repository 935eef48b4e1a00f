//! Keeps the beacon aligned with provider auth events.
//!
//! This is where the beacon is created on sign-in and cleared on sign-out.
//! Every provider confirmation of a live user refreshes the assertion time,
//! as does every beacon read that finds it still valid.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::beacon::SessionBeacon;
use crate::clock::Clock;
use crate::provider::{AuthEvent, AuthSnapshot};
use crate::storage::KeyValueStore;

/// Applies provider state to a beacon.
pub struct SessionSync<S, C> {
    beacon: Arc<SessionBeacon<S, C>>,
}

impl<S: KeyValueStore, C: Clock> SessionSync<S, C> {
    /// Creates a sync over a shared beacon.
    pub const fn new(beacon: Arc<SessionBeacon<S, C>>) -> Self {
        Self { beacon }
    }

    /// Applies a discrete provider event.
    pub fn apply_event(&self, event: &AuthEvent) {
        match event {
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                debug!(user = %session.user.id, "Provider confirmed session");
                self.beacon.mark_authenticated();
            }
            AuthEvent::SignedOut => {
                debug!("Provider signed out");
                self.beacon.clear();
            }
        }
    }

    /// Applies a snapshot. Loading snapshots change nothing.
    pub fn apply_snapshot(&self, snapshot: &AuthSnapshot) {
        if snapshot.loading {
            return;
        }
        if snapshot.user.is_some() {
            self.beacon.mark_authenticated();
        } else {
            self.beacon.clear();
        }
    }

    /// Applies the current snapshot and every later one until the sender is
    /// dropped.
    pub async fn follow(self, mut snapshots: watch::Receiver<AuthSnapshot>) {
        loop {
            let current = snapshots.borrow_and_update().clone();
            self.apply_snapshot(&current);
            if snapshots.changed().await.is_err() {
                break;
            }
        }
    }
}
