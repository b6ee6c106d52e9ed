//! Request identity
//!
//! `CurrentUser` resolves the `session` cookie to a user once per request and
//! caches the result in the request extensions.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use super::cookies::session_token;
use super::error::WebError;
use super::state::AppState;
use crate::models::User;

/// The logged-in user, if any
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    /// Look up the session named by the request cookies
    pub async fn resolve(state: &AppState, headers: &HeaderMap) -> Result<Self, WebError> {
        let Some(token) = session_token(headers) else {
            return Ok(Self(None));
        };
        let user = state.user_service.validate_session(&token).await?;
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(cached) = parts.extensions.get::<CurrentUser>() {
            return Ok(cached.clone());
        }

        let current = Self::resolve(state, &parts.headers).await?;
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

/// User guaranteed by the `require_login` middleware
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);
