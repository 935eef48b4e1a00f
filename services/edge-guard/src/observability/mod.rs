//! Observability Module
//!
//! Prometheus counters for guard decisions and structured decision logging.

pub mod logging;
pub mod metrics;

pub use logging::log_evaluation;
pub use metrics::GuardMetrics;
