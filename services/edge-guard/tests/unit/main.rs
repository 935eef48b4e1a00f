//! Unit Tests
//!
//! Organized by domain. Each submodule focuses on one area:
//! - config: environment parsing and loop-safe validation
//! - guard: signal reading and the decision table
//! - middleware: the layered service stack
//! - error: error codes and response bodies

mod config;
mod error;
mod guard;
mod middleware;
