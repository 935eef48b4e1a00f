//! Guard Metrics
//!
//! Provides Prometheus counters for routing decisions, registered in a
//! registry owned by the service.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use session_bridge::RouteClass;

use crate::guard::Evaluation;

/// Guard decision metrics
#[derive(Clone)]
pub struct GuardMetrics {
    registry: Registry,
    /// Decisions by route class and action
    pub decisions: IntCounterVec,
    /// Requests that arrived with the redirect marker
    pub marker_consumed: IntCounter,
}

impl GuardMetrics {
    /// Creates metrics in a fresh registry
    ///
    /// # Errors
    ///
    /// Returns an error when a metric cannot be registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Creates metrics in the given registry
    ///
    /// # Errors
    ///
    /// Returns an error when a metric cannot be registered, for example
    /// because the registry already holds one with the same name.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let decisions = IntCounterVec::new(
            Opts::new("decisions_total", "Total edge guard routing decisions")
                .namespace("edge_guard"),
            &["class", "action"],
        )?;
        registry.register(Box::new(decisions.clone()))?;

        let marker_consumed = IntCounter::with_opts(
            Opts::new(
                "marker_consumed_total",
                "Total requests forwarded because they carried the redirect marker",
            )
            .namespace("edge_guard"),
        )?;
        registry.register(Box::new(marker_consumed.clone()))?;

        Ok(Self {
            registry,
            decisions,
            marker_consumed,
        })
    }

    /// Records one evaluation
    pub fn record(&self, evaluation: &Evaluation) {
        let action = evaluation.action_label();
        self.decisions
            .with_label_values(&[evaluation.class.as_str(), action])
            .inc();
        if evaluation.signals.is_none() {
            self.marker_consumed.inc();
        }
    }

    /// Decision count for a class and action label
    #[must_use]
    pub fn decision_count(&self, class: RouteClass, action: &str) -> u64 {
        self.decisions
            .with_label_values(&[class.as_str(), action])
            .get()
    }

    /// Renders the registry in the Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns an error when encoding fails.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
