//! Shared proptest generators.
//!
//! Path generators are built from the default route policy, so a path from
//! [`protected_path_strategy`] always classifies as protected under
//! `RoutePolicy::default()`.

use proptest::prelude::*;
use session_bridge::protocol::{AUTH_COOKIE_NAME, AUTHENTICATED};
use session_bridge::{RouteClass, RoutePolicy};

/// A path segment that is safe in a URI.
pub fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9_-]{0,11}"
}

/// Zero to three trailing segments, each with a leading slash.
fn tail_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(segment_strategy(), 0..3).prop_map(|segs| {
        segs.iter().map(|s| format!("/{s}")).collect::<String>()
    })
}

/// Paths under the default auth prefixes.
pub fn auth_path_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("/login"), Just("/signup"), Just("/auth")],
        tail_strategy(),
    )
        .prop_map(|(prefix, tail)| format!("{prefix}{tail}"))
}

/// Paths under the default protected prefixes.
pub fn protected_path_strategy() -> impl Strategy<Value = String> {
    (prop_oneof![Just("/dashboard"), Just("/chat")], tail_strategy())
        .prop_map(|(prefix, tail)| format!("{prefix}{tail}"))
}

/// Paths that classify as public, including near misses such as `/loginx`.
pub fn public_path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        (segment_strategy(), tail_strategy()).prop_map(|(s, t)| format!("/{s}{t}")),
        (
            prop_oneof![Just("/login"), Just("/dashboard"), Just("/chat")],
            "[a-z0-9]{1,4}"
        )
            .prop_map(|(prefix, suffix)| format!("{prefix}{suffix}")),
    ]
    .prop_filter("must classify as public", |p| {
        RoutePolicy::default().classify(p) == RouteClass::Public
    })
}

/// Any path together with its class under the default policy.
pub fn classified_path_strategy() -> impl Strategy<Value = (String, RouteClass)> {
    prop_oneof![
        auth_path_strategy().prop_map(|p| (p, RouteClass::Auth)),
        protected_path_strategy().prop_map(|p| (p, RouteClass::Protected)),
        public_path_strategy().prop_map(|p| (p, RouteClass::Public)),
    ]
}

/// Query strings without the redirect marker.
pub fn query_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(
        prop::collection::vec(("[a-z]{1,6}", "[a-zA-Z0-9._-]{0,8}"), 1..4).prop_map(|pairs| {
            pairs
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&")
        }),
    )
    .prop_filter("must not contain the marker key", |q| {
        q.as_deref().is_none_or(|q| !q.contains("redirected"))
    })
}

/// Provider session cookie names as issued, including chunked ones.
pub fn provider_cookie_name_strategy() -> impl Strategy<Value = String> {
    ("[a-z0-9]{4,12}", prop::option::of(0u8..4)).prop_map(|(project, chunk)| match chunk {
        Some(n) => format!("sb-{project}-auth-token.{n}"),
        None => format!("sb-{project}-auth-token"),
    })
}

/// Cookies that carry no auth signal.
pub fn noise_cookie_strategy() -> impl Strategy<Value = (String, String)> {
    (
        prop_oneof![
            Just("theme".to_string()),
            Just("_ga".to_string()),
            Just("locale".to_string()),
            Just("__next_hmr_sb-token".to_string()),
            Just("sb-project-code-verifier".to_string()),
        ],
        "[a-z0-9]{1,10}",
    )
}

/// Which signals a generated request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalState {
    /// Provider session cookie present
    pub provider: bool,
    /// Mirrored cookie set to `authenticated`
    pub mirror: bool,
}

impl SignalState {
    /// Whether the edge should treat the request as signed in.
    #[must_use]
    pub const fn authenticated(self) -> bool {
        self.provider || self.mirror
    }
}

/// Signal combinations paired with a `Cookie` header that encodes them,
/// shuffled among noise cookies. `None` means no header at all.
pub fn cookie_header_strategy() -> impl Strategy<Value = (SignalState, Option<String>)> {
    (
        any::<bool>(),
        any::<bool>(),
        provider_cookie_name_strategy(),
        prop::collection::vec(noise_cookie_strategy(), 0..4),
    )
        .prop_flat_map(|(provider, mirror, name, noise)| {
            let mut pairs: Vec<String> = noise.iter().map(|(k, v)| format!("{k}={v}")).collect();
            if provider {
                pairs.push(format!("{name}=base64-eyJhY2Nlc3NfdG9rZW4iOiJ4In0"));
            }
            if mirror {
                pairs.push(format!("{AUTH_COOKIE_NAME}={AUTHENTICATED}"));
            }
            let state = SignalState { provider, mirror };
            Just(pairs).prop_shuffle().prop_map(move |pairs| {
                let header = if pairs.is_empty() {
                    None
                } else {
                    Some(pairs.join("; "))
                };
                (state, header)
            })
        })
}

/// Garbage `Cookie` header bytes.
pub fn malformed_cookie_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(0x20u8..0x7f, 0..40),
        prop::collection::vec(0x80u8..=0xff, 1..20),
        Just(b"client-auth-status".to_vec()),
        Just(b";;;===".to_vec()),
        Just(b"client-auth-status=authenticatedX".to_vec()),
    ]
    .prop_filter("must not spell a valid signal", |raw| {
        let text = String::from_utf8_lossy(raw).to_ascii_lowercase();
        !text.contains("client-auth-status=authenticated;")
            && !text.ends_with("client-auth-status=authenticated")
            && !text.contains("token")
    })
}
