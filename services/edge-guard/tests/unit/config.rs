//! Configuration Unit Tests

use std::collections::HashMap;

use edge_guard::{Config, ConfigError, ProviderCookieMode, ProviderCookiePolicy};

fn lookup(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn test_full_configuration() {
    let config = Config::from_lookup(&lookup(&[
        ("HOST", "127.0.0.1"),
        ("PORT", "9000"),
        ("UPSTREAM_URL", "https://app.internal:8443"),
        ("AUTH_ENTRY_PATH", "/auth/sign-in"),
        ("PROTECTED_LANDING_PATH", "/chat"),
        ("PROVIDER_COOKIE_MODE", "exact"),
        ("PROVIDER_COOKIE_NAMES", "sb-a-auth-token, sb-b-auth-token"),
        ("REQUEST_TIMEOUT", "5"),
        ("SHUTDOWN_TIMEOUT", "10"),
    ]))
    .unwrap();

    assert_eq!(config.bind_address(), "127.0.0.1:9000");
    assert_eq!(config.upstream_url.as_str(), "https://app.internal:8443/");
    assert_eq!(config.provider_cookie_mode, ProviderCookieMode::Exact);
    assert_eq!(
        config.cookie_policy(),
        ProviderCookiePolicy::exact(["sb-a-auth-token", "sb-b-auth-token"])
    );
    assert_eq!(config.request_timeout_secs, 5);
    assert_eq!(config.route_policy().auth_entry(), "/auth/sign-in");
}

#[test]
fn test_non_numeric_port_is_parse_error() {
    let err = Config::from_lookup(&lookup(&[("PORT", "eighty")])).unwrap_err();
    assert!(matches!(err, ConfigError::Env(_)));
}

#[test]
fn test_relative_target_is_rejected() {
    let err = Config::from_lookup(&lookup(&[("AUTH_ENTRY_PATH", "login")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPath { .. }));
}

#[test]
fn test_protocol_relative_target_is_rejected() {
    let err =
        Config::from_lookup(&lookup(&[("PROTECTED_LANDING_PATH", "//evil.example/dashboard")]))
            .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPath { .. }));
}

#[test]
fn test_swapped_targets_are_rejected() {
    let err = Config::from_lookup(&lookup(&[
        ("AUTH_ENTRY_PATH", "/dashboard"),
        ("PROTECTED_LANDING_PATH", "/login"),
    ]))
    .unwrap_err();
    assert!(matches!(err, ConfigError::LoopingTarget { .. }));
}

#[test]
fn test_non_http_upstream_is_rejected() {
    let err = Config::from_lookup(&lookup(&[("UPSTREAM_URL", "ftp://files.example")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUrl { .. }));
}
