//! Signal reading.

use edge_guard::{AuthSignals, ProviderCookiePolicy};
use http::header::COOKIE;
use http::{HeaderMap, HeaderValue};
use proptest::prelude::*;
use test_utils::{cookie_header_strategy, malformed_cookie_strategy};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The decoded signals match what was encoded, regardless of noise and
    /// ordering.
    #[test]
    fn prop_signals_round_trip((state, cookie) in cookie_header_strategy()) {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            headers.insert(COOKIE, HeaderValue::from_str(&cookie).unwrap());
        }
        let signals = AuthSignals::from_headers(&headers, &ProviderCookiePolicy::default());
        prop_assert_eq!(signals.provider_cookie, state.provider);
        prop_assert_eq!(signals.mirror_cookie, state.mirror);
        prop_assert_eq!(signals.is_authenticated(), state.authenticated());
    }

    /// Garbage headers read as signed out.
    #[test]
    fn prop_malformed_headers_fail_closed(raw in malformed_cookie_strategy()) {
        prop_assume!(HeaderValue::from_bytes(&raw).is_ok());
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_bytes(&raw).unwrap());
        let signals = AuthSignals::from_headers(&headers, &ProviderCookiePolicy::default());
        prop_assert!(!signals.is_authenticated());
    }
}
