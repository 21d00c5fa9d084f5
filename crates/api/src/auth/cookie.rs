//! The HttpOnly `access_token` cookie.
//!
//! Browsers get the access token as a cookie on login and refresh; API
//! clients can keep using the `Authorization` header. Both are accepted by
//! [`crate::middleware::auth::AuthUser`].

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Cookie name carrying the access JWT.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Add the access-token cookie to `jar`.
pub fn set_access_cookie(jar: CookieJar, token: String, secure: bool) -> CookieJar {
    jar.add(
        Cookie::build((ACCESS_TOKEN_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax),
    )
}

/// Add an expired access-token cookie to `jar`, so the browser drops it
/// whether or not the request carried one.
pub fn clear_access_cookie(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::build((ACCESS_TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build();
    cookie.make_removal();
    jar.add(cookie)
}
