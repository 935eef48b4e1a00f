//! Structured decision logging.

use tracing::{debug, info};

use crate::guard::{Evaluation, GuardOutcome};

/// Logs one guard evaluation. Redirects log at `info`, everything else at
/// `debug`. Cookie values are never logged.
pub fn log_evaluation(path: &str, evaluation: &Evaluation) {
    let action = evaluation.action_label();
    let authenticated = evaluation.signals.map(|s| s.is_authenticated());
    match &evaluation.outcome {
        GuardOutcome::Redirect { location } => info!(
            path,
            class = %evaluation.class,
            action,
            ?authenticated,
            location = ?location,
            "Redirecting navigation"
        ),
        GuardOutcome::ConsumeMarker { path_and_query } => debug!(
            path,
            class = %evaluation.class,
            action,
            forwarded = %path_and_query,
            "Redirect marker consumed"
        ),
        GuardOutcome::Allow => debug!(
            path,
            class = %evaluation.class,
            action,
            ?authenticated,
            "Navigation allowed"
        ),
    }
}
