//! Cookie mirror: projects the beacon into the edge-visible auth cookie.
//!
//! The mirror writes once on start, again on every tick of a fixed period,
//! and immediately whenever storage reports a change to the beacon status
//! (a sign-out in another tab, say). The cookie is a cache of the beacon and
//! is rewritten wholesale each time; nothing ever reads it back.
//!
//! The loop is owned by a [`MirrorHandle`]. Stopping or dropping the handle
//! cancels the timer and the storage subscription.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::beacon::SessionBeacon;
use crate::clock::Clock;
use crate::cookie_jar::{CookieStore, auth_cookie, auth_cookie_removal};
use crate::protocol::STATUS_KEY;
use crate::storage::KeyValueStore;

/// Resync period.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(5);

/// Outcome of one mirror pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorWrite {
    /// The cookie was set to `authenticated`
    Set,
    /// The cookie was deleted
    Cleared,
    /// The jar refused the write; the edge keeps its previous view
    Failed,
}

/// Copies beacon state into a cookie jar.
pub struct CookieMirror<S, C, J> {
    beacon: Arc<SessionBeacon<S, C>>,
    jar: Arc<J>,
    period: Duration,
}

impl<S, C, J> CookieMirror<S, C, J>
where
    S: KeyValueStore + 'static,
    C: Clock + 'static,
    J: CookieStore + 'static,
{
    /// Creates a mirror with the default 5 second period.
    pub const fn new(beacon: Arc<SessionBeacon<S, C>>, jar: Arc<J>) -> Self {
        Self {
            beacon,
            jar,
            period: DEFAULT_SYNC_INTERVAL,
        }
    }

    /// Overrides the resync period.
    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Recomputes the beacon and rewrites the cookie once.
    pub fn sync_once(&self) -> MirrorWrite {
        let (cookie, outcome) = if self.beacon.is_authenticated() {
            (auth_cookie(), MirrorWrite::Set)
        } else {
            (auth_cookie_removal(), MirrorWrite::Cleared)
        };
        match self.jar.set(cookie) {
            Ok(()) => {
                debug!(outcome = ?outcome, "Auth cookie mirrored");
                outcome
            }
            Err(e) => {
                warn!(error = %e, "Auth cookie write failed");
                MirrorWrite::Failed
            }
        }
    }

    /// Writes the cookie now and starts the background loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> MirrorHandle {
        // Subscribe before the first write so no change slips between them.
        let mut events = self.beacon.store().subscribe();
        self.sync_once();

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let period = self.period;
        // Scheduled from the start call, not from the task's first poll.
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let task = tokio::spawn(async move {
            let mut listening = true;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        self.sync_once();
                    }
                    event = events.recv(), if listening => match event {
                        Ok(event) if event.touches(STATUS_KEY) => {
                            self.sync_once();
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "Storage events lagged, resyncing");
                            self.sync_once();
                        }
                        Err(RecvError::Closed) => {
                            info!("Storage notifications closed, continuing on timer only");
                            listening = false;
                        }
                    },
                }
            }
            debug!("Cookie mirror stopped");
        });

        info!(period = ?period, "Cookie mirror started");
        MirrorHandle {
            stop: Some(stop_tx),
            task: Some(task),
        }
    }
}

/// Lifetime of a running mirror.
#[derive(Debug)]
pub struct MirrorHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MirrorHandle {
    /// Stops the loop and waits for it to exit. No cookie write happens after
    /// this returns.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Cookie mirror task ended abnormally");
            }
        }
    }

    /// Returns true until the loop has exited.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for MirrorHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
