//! Refresh-token cookie transport.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::HttpRequest;

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Cookie carrying a freshly issued refresh token.
pub fn refresh_cookie(token: &str, lifetime: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE_NAME, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::seconds(lifetime.num_seconds()))
        .finish()
}

/// Empty, already-expired cookie that makes the client drop its refresh token.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build(REFRESH_COOKIE_NAME, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .finish();
    cookie.make_removal();
    cookie
}

/// Refresh token sent by the client, if any. Empty values count as absent.
pub fn read_refresh_cookie(req: &HttpRequest) -> Option<String> {
    req.cookie(REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
