//! One-shot notices carried across a redirect
//!
//! Notices are stored in the `flash` cookie as url-encoded JSON. The next page
//! that renders them also expires the cookie.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use std::convert::Infallible;

use super::cookies::cookie_value;
use crate::theme::Notice;

pub const FLASH_COOKIE: &str = "flash";

/// Notices set by the previous response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash(pub Vec<Notice>);

impl Flash {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read notices from the request cookies. Malformed values are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(raw) = cookie_value(headers, FLASH_COOKIE) else {
            return Self::default();
        };
        if raw.is_empty() {
            return Self::default();
        }

        let decoded = match urlencoding::decode(&raw) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!("Ignoring undecodable flash cookie: {}", e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Vec<Notice>>(&decoded) {
            Ok(notices) => Self(notices),
            Err(e) => {
                tracing::debug!("Ignoring malformed flash cookie: {}", e);
                Self::default()
            }
        }
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// `Set-Cookie` value that stores `notices` for the next request
pub fn set_flash_cookie(notices: &[Notice]) -> Option<HeaderValue> {
    let json = match serde_json::to_string(notices) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Failed to encode flash notices: {}", e);
            return None;
        }
    };
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        FLASH_COOKIE,
        urlencoding::encode(&json)
    );
    HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value that expires the flash cookie
pub fn clear_flash_cookie() -> HeaderValue {
    HeaderValue::from_static("flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Append a flash cookie carrying `notices` to `headers`
pub fn push_flash(headers: &mut HeaderMap, notices: &[Notice]) {
    if let Some(value) = set_flash_cookie(notices) {
        headers.append(header::SET_COOKIE, value);
    }
}
