//! Errors surfaced by page handlers
//!
//! `WebError` turns into a bare status response tagged with an [`ErrorPage`]
//! extension; the `render_error_pages` middleware replaces the body with the
//! themed `error.html`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::services::category::CategoryServiceError;
use crate::services::news::NewsServiceError;
use crate::services::user::UserServiceError;

pub const NOT_FOUND_MESSAGE: &str = "The page you requested does not exist.";
pub const INTERNAL_MESSAGE: &str = "Something went wrong on our side. Please try again later.";

/// Error type for page handlers
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl WebError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Marker left on error responses for the error page renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: &'static str,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::NotFound(what) => {
                tracing::debug!("Not found: {}", what);
                NOT_FOUND_MESSAGE
            }
            Self::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                INTERNAL_MESSAGE
            }
        };

        let mut response = (status, message).into_response();
        response.extensions_mut().insert(ErrorPage { status, message });
        response
    }
}

impl From<NewsServiceError> for WebError {
    fn from(e: NewsServiceError) -> Self {
        match e {
            NewsServiceError::InvalidPage(page) => Self::NotFound(page.to_string()),
            NewsServiceError::CategoryNotFound(id) => Self::NotFound(format!("category {}", id)),
            NewsServiceError::InternalError(e) => Self::Internal(e),
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<CategoryServiceError> for WebError {
    fn from(e: CategoryServiceError) -> Self {
        match e {
            CategoryServiceError::InternalError(e) => Self::Internal(e),
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<UserServiceError> for WebError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::InternalError(e) => Self::Internal(e),
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}
