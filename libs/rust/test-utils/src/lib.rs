//! Shared test utilities for the session bridge and the edge guard.
//!
//! This crate provides:
//! - Proptest generators for paths, queries and cookie headers
//! - Recording and scripted implementations of the client-side traits
//! - Fixtures that assemble a client context around a manual clock

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
