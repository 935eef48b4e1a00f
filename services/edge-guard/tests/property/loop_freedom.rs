//! Loop freedom.
//!
//! For any path and any cookie state, the guard either forwards or
//! redirects to a target that forwards on the next request, whether or not
//! the browser keeps the marker.

use edge_guard::{GuardOutcome, ProviderCookiePolicy, RedirectGuard};
use http::header::COOKIE;
use http::{HeaderMap, HeaderValue, Uri};
use proptest::prelude::*;
use session_bridge::protocol::REDIRECT_MARKER_PARAM;
use session_bridge::{RouteClass, RoutePolicy};
use test_utils::{classified_path_strategy, cookie_header_strategy, query_strategy};

fn guard() -> RedirectGuard {
    RedirectGuard::new(RoutePolicy::default(), ProviderCookiePolicy::default()).unwrap()
}

fn headers(cookie: Option<&str>) -> HeaderMap {
    let mut map = HeaderMap::new();
    if let Some(cookie) = cookie {
        map.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
    }
    map
}

fn uri(path: &str, query: Option<&str>) -> Uri {
    match query {
        Some(q) => format!("{path}?{q}").parse().unwrap(),
        None => path.parse().unwrap(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// At most one redirect per navigation.
    #[test]
    fn prop_redirect_target_is_forwarded(
        (path, class) in classified_path_strategy(),
        query in query_strategy(),
        (state, cookie) in cookie_header_strategy(),
    ) {
        let guard = guard();
        let headers = headers(cookie.as_deref());
        let first = guard.evaluate(&uri(&path, query.as_deref()), &headers);
        prop_assert_eq!(first.class, class);

        let GuardOutcome::Redirect { location } = first.outcome else {
            return Ok(());
        };
        let location = location.to_str().unwrap().to_string();
        prop_assert!(location.contains(REDIRECT_MARKER_PARAM));

        // With the marker, as sent.
        let second = guard.evaluate(&location.parse().unwrap(), &headers);
        prop_assert!(
            matches!(second.outcome, GuardOutcome::ConsumeMarker { .. }),
            "marked redirect target was not forwarded"
        );

        // Without the marker, the table alone must allow the target.
        let bare = location.split('?').next().unwrap_or_default();
        let third = guard.evaluate(&bare.parse().unwrap(), &headers);
        prop_assert_eq!(third.outcome, GuardOutcome::Allow);

        let expected = if state.authenticated() { RouteClass::Auth } else { RouteClass::Protected };
        prop_assert_eq!(class, expected);
    }

    /// Public paths are never redirected.
    #[test]
    fn prop_public_paths_always_allowed(
        (path, class) in classified_path_strategy(),
        (_, cookie) in cookie_header_strategy(),
    ) {
        prop_assume!(class == RouteClass::Public);
        let evaluation = guard().evaluate(&uri(&path, None), &headers(cookie.as_deref()));
        prop_assert_eq!(evaluation.outcome, GuardOutcome::Allow);
    }
}
