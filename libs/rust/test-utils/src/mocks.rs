//! Mock implementations for testing.
//!
//! This module provides recording and scripted implementations of the
//! client-side traits for use in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use session_bridge::{IdentityProvider, Navigator, ProviderError, Session};

/// Navigator that records every target.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    targets: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    /// Create a new recording navigator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All targets in call order.
    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().clone()
    }

    /// Most recent target.
    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.targets.lock().last().cloned()
    }

    /// Forget recorded targets.
    pub fn clear(&self) {
        self.targets.lock().clear();
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        self.targets.lock().push(target.to_string());
    }
}

/// Identity provider with a fixed, replaceable answer.
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    answer: Arc<Mutex<Result<Option<Session>, ProviderError>>>,
    calls: Arc<AtomicUsize>,
}

impl StaticIdentityProvider {
    /// Provider that reports `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self::answering(Ok(Some(session)))
    }

    /// Provider with nobody signed in.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::answering(Ok(None))
    }

    /// Provider that fails every lookup.
    #[must_use]
    pub fn failing(error: ProviderError) -> Self {
        Self::answering(Err(error))
    }

    fn answering(answer: Result<Option<Session>, ProviderError>) -> Self {
        Self {
            answer: Arc::new(Mutex::new(answer)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replaces the answer for later lookups.
    pub fn set_answer(&self, answer: Result<Option<Session>, ProviderError>) {
        *self.answer.lock() = answer;
    }

    /// Number of lookups so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.lock().clone()
    }
}
