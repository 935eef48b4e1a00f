//! Edge redirect guard.
//!
//! Decides, from request-visible signals only, whether a navigation goes
//! through or is redirected. The decision is synchronous and never fails:
//! anything unreadable counts as signed out.

pub mod decision;
pub mod signals;

pub use decision::{Action, Evaluation, GuardOutcome, RedirectGuard, decide};
pub use signals::{AuthSignals, ProviderCookiePolicy};
