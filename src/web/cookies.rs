//! Cookie header helpers

use axum::http::{header, HeaderMap, HeaderValue};

use crate::models::Session;

pub const SESSION_COOKIE: &str = "session";

/// Value of the cookie `name`, if the request carries it
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_str) = cookie_header.to_str() else {
            continue;
        };
        for cookie in cookie_str.split(';') {
            if let Some((key, value)) = cookie.trim().split_once('=') {
                if key == name {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Session token from the `session` cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE).filter(|token| !token.is_empty())
}

/// `Set-Cookie` value for a freshly started session
pub fn session_cookie(session: &Session) -> Option<HeaderValue> {
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        session.id,
        session.max_age_seconds()
    );
    HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value that ends the session on the client
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
