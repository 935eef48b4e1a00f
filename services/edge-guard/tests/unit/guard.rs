//! Guard Unit Tests
//!
//! The decision table, marker handling and fail-closed signal reading.

use edge_guard::guard::{Action, decide};
use edge_guard::{GuardOutcome, ProviderCookiePolicy, RedirectGuard};
use http::header::COOKIE;
use http::{HeaderMap, HeaderValue};
use session_bridge::{RouteClass, RoutePolicy};
use test_utils::fixtures::{MIRROR_COOKIE, PROVIDER_COOKIE};

fn guard() -> RedirectGuard {
    RedirectGuard::new(RoutePolicy::default(), ProviderCookiePolicy::default()).unwrap()
}

fn cookies(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
    headers
}

fn outcome(uri: &str, headers: &HeaderMap) -> GuardOutcome {
    guard().evaluate(&uri.parse().unwrap(), headers).outcome
}

fn redirect_to(location: &'static str) -> GuardOutcome {
    GuardOutcome::Redirect {
        location: HeaderValue::from_static(location),
    }
}

// ============================================================================
// Decision table
// ============================================================================

#[test]
fn test_every_redirect_lands_on_an_allowed_class() {
    let policy = RoutePolicy::default();
    for authenticated in [true, false] {
        for class in [RouteClass::Auth, RouteClass::Protected, RouteClass::Public] {
            let target = match decide(authenticated, class) {
                Action::Allow => continue,
                Action::RedirectToAuthEntry => policy.auth_entry(),
                Action::RedirectToLanding => policy.protected_landing(),
            };
            let second = decide(authenticated, policy.classify(target));
            assert_eq!(second, Action::Allow, "{authenticated} {class}");
        }
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_signed_in_user_visiting_login() {
    assert_eq!(
        outcome("/login", &cookies(MIRROR_COOKIE)),
        redirect_to("/dashboard?redirected=true")
    );
    assert_eq!(
        outcome("/dashboard?redirected=true", &cookies(MIRROR_COOKIE)),
        GuardOutcome::ConsumeMarker {
            path_and_query: "/dashboard".to_string()
        }
    );
}

#[test]
fn test_signed_out_user_visiting_dashboard() {
    assert_eq!(
        outcome("/dashboard", &HeaderMap::new()),
        redirect_to("/login?redirected=true")
    );
    assert_eq!(
        outcome("/login?redirected=true", &HeaderMap::new()),
        GuardOutcome::ConsumeMarker {
            path_and_query: "/login".to_string()
        }
    );
}

#[test]
fn test_provider_cookie_dominates_missing_mirror() {
    assert_eq!(outcome("/chat", &cookies(PROVIDER_COOKIE)), GuardOutcome::Allow);
    assert_eq!(
        outcome("/signup", &cookies(PROVIDER_COOKIE)),
        redirect_to("/dashboard?redirected=true")
    );
}

#[test]
fn test_stale_mirror_value_is_signed_out() {
    assert_eq!(
        outcome("/chat", &cookies("client-auth-status=")),
        redirect_to("/login?redirected=true")
    );
}

#[test]
fn test_exact_policy_ignores_heuristic_names() {
    let guard = RedirectGuard::new(
        RoutePolicy::default(),
        ProviderCookiePolicy::exact(["sb-prod-auth-token"]),
    )
    .unwrap();
    let evaluation = guard.evaluate(&"/chat".parse().unwrap(), &cookies(PROVIDER_COOKIE));
    assert!(matches!(evaluation.outcome, GuardOutcome::Redirect { .. }));

    let evaluation = guard.evaluate(
        &"/chat".parse().unwrap(),
        &cookies("sb-prod-auth-token.0=abc; sb-prod-auth-token.1=def"),
    );
    assert_eq!(evaluation.outcome, GuardOutcome::Allow);
}

#[test]
fn test_non_utf8_cookie_header_fails_closed() {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_bytes(b"client-auth-status=\xe9").unwrap());
    assert_eq!(
        outcome("/dashboard", &headers),
        redirect_to("/login?redirected=true")
    );
}
