//! Environment variable parsing.
//!
//! Service configuration reads every value through an [`EnvLookup`] so the
//! same parsing code runs against the process environment in production and
//! against a plain map in tests.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while interpreting environment values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// The variable was set but its value did not parse
    #[error("Failed to parse environment variable {name}: {reason}")]
    Parse {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// A source of raw environment values.
pub trait EnvLookup {
    /// Returns the raw value for `name`, if set.
    fn get(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

/// Returns the trimmed value of `name`, treating blank values as unset.
fn lookup(env: &impl EnvLookup, name: &str) -> Option<String> {
    env.get(name)
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses `name` into `T`, falling back to `default` when unset.
///
/// # Errors
///
/// Returns [`EnvError::Parse`] when the variable is set to a value `T`
/// cannot parse.
pub fn parse_or<T>(env: &impl EnvLookup, name: &str, default: T) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(env, name) {
        Some(value) => value.parse().map_err(|e: T::Err| EnvError::Parse {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Reads `name` as a string, falling back to `default` when unset.
#[must_use]
pub fn string_or(env: &impl EnvLookup, name: &str, default: &str) -> String {
    lookup(env, name).unwrap_or_else(|| default.to_string())
}

/// Reads a comma-separated list, dropping blank entries.
#[must_use]
pub fn list(env: &impl EnvLookup, name: &str) -> Vec<String> {
    lookup(env, name)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}
