//! Page middleware
//!
//! - `require_login`: redirects anonymous visitors to the login page
//! - `render_error_pages`: renders `error.html` for handler errors and unknown routes

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use tera::Context as TeraContext;

use super::cookies::session_token;
use super::error::{ErrorPage, WebError};
use super::identity::{AuthenticatedUser, CurrentUser};
use super::state::AppState;
use crate::theme::StandardTemplateVars;

pub const LOGIN_PATH: &str = "/login";

/// Login URL that returns to `path` afterwards
pub fn login_redirect_target(path: &str) -> String {
    format!(
        "{}?next={}",
        LOGIN_PATH,
        urlencoding::encode(path).replace("%2F", "/")
    )
}

/// Authentication middleware
pub async fn require_login(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let current = CurrentUser::resolve(&state, request.headers()).await?;

    let Some(user) = current.0.clone() else {
        let target = login_redirect_target(request.uri().path());
        tracing::debug!(path = %request.uri().path(), "Anonymous request redirected to login");
        return Ok(Redirect::to(&target).into_response());
    };

    request.extensions_mut().insert(current);
    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Replace the body of error responses with the rendered error page
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let request_path = request.uri().path().to_string();
    let token = session_token(request.headers());

    let response = next.run(request).await;
    let Some(page) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    let current_user = match token {
        Some(token) => state
            .user_service
            .validate_session(&token)
            .await
            .ok()
            .flatten(),
        None => None,
    };

    let vars = StandardTemplateVars {
        site_name: state.site.name.clone(),
        current_user,
        request_path,
        messages: Vec::new(),
    };
    let mut context = TeraContext::new();
    context.insert("status", &page.status.as_u16());
    context.insert("message", page.message);

    match state
        .theme
        .render_with_standard_vars("error.html", &context, &vars)
    {
        Ok(html) => {
            let mut rendered = (page.status, Html(html)).into_response();
            for cookie in response.headers().get_all(header::SET_COOKIE) {
                rendered.headers_mut().append(header::SET_COOKIE, cookie.clone());
            }
            rendered
        }
        Err(e) => {
            tracing::error!("Failed to render error page: {:#}", e);
            response
        }
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> WebError {
    WebError::not_found("no such route")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_target_keeps_slashes() {
        assert_eq!(login_redirect_target("/news/add"), "/login?next=/news/add");
    }

    #[test]
    fn test_login_redirect_target_escapes_query_characters() {
        assert_eq!(login_redirect_target("/a&b"), "/login?next=/a%26b");
    }
}
