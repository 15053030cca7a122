use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "auth_token";

fn base_cookie(value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(false)
        .build()
}

/// HTTP-only, path-scoped cookie holding a freshly issued token
pub fn session_cookie(token: String) -> Cookie<'static> {
    base_cookie(token)
}

/// Empty, already-expired cookie that makes the browser drop the session
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = base_cookie(String::new());
    cookie.make_removal();
    cookie
}

/// Reads the session token, treating an empty value as absent
pub fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
}
