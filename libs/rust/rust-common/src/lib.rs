//! Shared library for cross-cutting concerns in session-bridge services.
//!
//! This crate provides centralized implementations for:
//! - Environment variable parsing with typed defaults
//! - Tracing subscriber initialization

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
pub mod tracing_config;

pub use env::{EnvError, EnvLookup, ProcessEnv};
pub use tracing_config::{TracingConfig, init_tracing};
