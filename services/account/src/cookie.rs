//! Cookie builders for the sealed correlation cookies and the session cookie.
//!
//! Correlation cookies carry the client's share of the pending-login state
//! (the server keeps none); they expire with the OTP itself.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the signed-in session token.
pub const SESSION_COOKIE: &str = "clickgate_session";

/// Non-persistent session lifetime in seconds (4 hours).
pub const SESSION_TTL_SECS: u64 = 14400;

/// Persistent ("remember me") session lifetime in seconds (7 days).
pub const PERSISTENT_SESSION_TTL_SECS: u64 = 604800;

/// Set one sealed correlation cookie, expiring together with the OTP.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use clickgate_account::cookie::set_sealed_cookie;
///
/// let jar = set_sealed_cookie(CookieJar::new(), "UserId", "opaque".to_string(), 180);
/// let cookie = jar.get("UserId").unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(180)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_sealed_cookie(
    jar: CookieJar,
    name: &'static str,
    sealed_value: String,
    max_age_secs: i64,
) -> CookieJar {
    let cookie = Cookie::build((name, sealed_value))
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Set the session cookie after a completed sign-in.
pub fn set_session_cookie(jar: CookieJar, token: String, persistent: bool) -> CookieJar {
    let max_age = if persistent {
        PERSISTENT_SESSION_TTL_SECS
    } else {
        SESSION_TTL_SECS
    };
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .max_age(Duration::seconds(max_age as i64))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
