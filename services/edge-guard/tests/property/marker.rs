//! Marker handling.

use edge_guard::{GuardOutcome, ProviderCookiePolicy, RedirectGuard};
use http::header::COOKIE;
use http::{HeaderMap, HeaderValue};
use proptest::prelude::*;
use session_bridge::RoutePolicy;
use session_bridge::protocol::{has_marker, with_marker};
use test_utils::{classified_path_strategy, cookie_header_strategy, query_strategy};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A marked request is forwarded whatever the cookies say, the
    /// forwarded URI no longer carries the marker, and the other query
    /// pairs survive in order.
    #[test]
    fn prop_marker_consumed_and_idempotent(
        (path, _) in classified_path_strategy(),
        query in query_strategy(),
        (_, cookie) in cookie_header_strategy(),
    ) {
        let guard =
            RedirectGuard::new(RoutePolicy::default(), ProviderCookiePolicy::default()).unwrap();
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            headers.insert(COOKIE, HeaderValue::from_str(&cookie).unwrap());
        }

        let original = match &query {
            Some(q) => format!("{path}?{q}"),
            None => path.clone(),
        };
        let marked = with_marker(&original);

        let GuardOutcome::ConsumeMarker { path_and_query } =
            guard.evaluate(&marked.parse().unwrap(), &headers).outcome
        else {
            return Err(TestCaseError::fail("marked request was not forwarded"));
        };
        prop_assert_eq!(&path_and_query, &original);

        let stripped_query = path_and_query.split_once('?').map(|(_, q)| q);
        prop_assert!(!has_marker(stripped_query));

        // Marking twice strips to the same request.
        let twice = with_marker(&marked);
        let again = guard.evaluate(&twice.parse().unwrap(), &headers).outcome;
        prop_assert_eq!(again, GuardOutcome::ConsumeMarker { path_and_query: original });
    }
}
