//! Client-side cookie writes for the edge-visible auth cookie.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use cookie::{Cookie, SameSite};
use parking_lot::RwLock;

use crate::error::CookieError;
use crate::protocol::{AUTH_COOKIE_MAX_AGE_SECS, AUTH_COOKIE_NAME, AUTHENTICATED};

/// The auth cookie asserting a signed-in beacon.
#[must_use]
pub fn auth_cookie() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, AUTHENTICATED))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(AUTH_COOKIE_MAX_AGE_SECS))
        .build()
}

/// The deletion form of the auth cookie: empty value, `Max-Age=0`.
#[must_use]
pub fn auth_cookie_removal() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, ""))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::ZERO)
        .build()
}

/// Where the mirror writes cookies.
pub trait CookieStore: Send + Sync {
    /// Applies a `Set-Cookie`. A `Max-Age` of zero deletes the cookie.
    ///
    /// # Errors
    ///
    /// Returns an error when the write is refused.
    fn set(&self, cookie: Cookie<'static>) -> Result<(), CookieError>;

    /// Reads the current value of a live cookie.
    ///
    /// # Errors
    ///
    /// Returns an error when cookies cannot be read.
    fn get(&self, name: &str) -> Result<Option<String>, CookieError>;
}

impl<T: CookieStore + ?Sized> CookieStore for Arc<T> {
    fn set(&self, cookie: Cookie<'static>) -> Result<(), CookieError> {
        (**self).set(cookie)
    }

    fn get(&self, name: &str) -> Result<Option<String>, CookieError> {
        (**self).get(name)
    }
}

/// A browser-like cookie jar held in memory.
///
/// Clones share cookies. [`MemoryCookieJar::header_value`] renders what the
/// next first-party navigation would send in its `Cookie` header.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieJar {
    cookies: Arc<RwLock<BTreeMap<String, Cookie<'static>>>>,
    unavailable: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryCookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of accepted writes, deletions included.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Stored cookie with its attributes.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        self.cookies.read().get(name).cloned()
    }

    /// Inserts a cookie the way another writer (e.g. the identity provider)
    /// would, bypassing availability.
    pub fn insert_raw(&self, name: &str, value: &str) {
        self.cookies
            .write()
            .insert(name.to_string(), Cookie::new(name.to_string(), value.to_string()));
    }

    /// `Cookie` request header for the live cookies, if any.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        let cookies = self.cookies.read();
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .values()
                .map(|c| format!("{}={}", c.name(), c.value()))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl CookieStore for MemoryCookieJar {
    fn set(&self, cookie: Cookie<'static>) -> Result<(), CookieError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CookieError::Unavailable);
        }
        if cookie.name().is_empty() || cookie.name().contains([';', '=', ' ']) {
            return Err(CookieError::Invalid(cookie.name().to_string()));
        }
        let expired = cookie
            .max_age()
            .is_some_and(|age| age <= cookie::time::Duration::ZERO);
        let mut cookies = self.cookies.write();
        if expired {
            cookies.remove(cookie.name());
        } else {
            cookies.insert(cookie.name().to_string(), cookie);
        }
        drop(cookies);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<String>, CookieError> {
        Ok(self.cookies.read().get(name).map(|c| c.value().to_string()))
    }
}
