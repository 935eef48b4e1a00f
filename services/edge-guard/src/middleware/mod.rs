//! Tower Middleware Stack
//!
//! Composable middleware layers for the edge guard service.

pub mod redirect_guard;
pub mod stack;
pub mod tracing;

pub use redirect_guard::{RedirectGuardLayer, RedirectGuardService};
pub use stack::apply_middleware;
pub use tracing::{CORRELATION_ID_HEADER, CorrelationId, TracingLayer};
