//! Property-based tests for the edge redirect guard.
//!
//! - loop_freedom: following a redirect once always ends in a forward
//! - marker: marker consumption is unconditional and idempotent
//! - signals: garbage never authenticates

mod loop_freedom;
mod marker;
mod signals;
