//! Property-based tests for rust-common crate.
//!
//! These tests verify universal properties across all inputs using proptest.

use std::collections::HashMap;

use proptest::prelude::*;
use rust_common::env;

fn single(name: &str, value: String) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert(name.to_string(), value);
    vars
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any in-range number parses back to itself, whitespace included.
    #[test]
    fn prop_numeric_values_parse(port in 1u16..=u16::MAX, pad in " {0,3}") {
        let vars = single("PORT", format!("{pad}{port}{pad}"));
        prop_assert_eq!(env::parse_or(&vars, "PORT", 8080u16), Ok(port));
    }

    /// Non-numeric input is rejected rather than silently defaulted.
    #[test]
    fn prop_garbage_is_rejected(raw in "[a-zA-Z]{1,12}") {
        let vars = single("PORT", raw);
        prop_assert!(env::parse_or(&vars, "PORT", 8080u16).is_err());
    }

    /// List parsing never yields blank entries.
    #[test]
    fn prop_list_entries_are_trimmed(items in prop::collection::vec("[ a-z0-9-]{0,8}", 0..6)) {
        let vars = single("NAMES", items.join(","));
        for entry in env::list(&vars, "NAMES") {
            prop_assert!(!entry.is_empty());
            prop_assert_eq!(entry.trim(), entry.as_str());
        }
    }
}
