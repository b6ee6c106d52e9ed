//! Page rendering
//!
//! `View` gathers what every page needs from the request (user, path, pending
//! flash notices) and renders a template with the standard variables and the
//! category sidebar.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use tera::Context as TeraContext;

use super::error::WebError;
use super::flash::{clear_flash_cookie, Flash};
use super::identity::CurrentUser;
use super::state::AppState;
use crate::models::User;
use crate::theme::{Notice, StandardTemplateVars};

/// Request-scoped page renderer
pub struct View {
    state: AppState,
    user: Option<User>,
    path: String,
    flash: Flash,
}

impl FromRequestParts<AppState> for View {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(Self {
            state: state.clone(),
            user,
            path: parts.uri.path().to_string(),
            flash: Flash::from_headers(&parts.headers),
        })
    }
}

impl View {
    /// Render `template` with `context`
    pub async fn render(self, template: &str, context: TeraContext) -> Result<Response, WebError> {
        self.render_with_notices(template, context, Vec::new()).await
    }

    /// Render `template`, showing `notices` after any pending flash notices
    pub async fn render_with_notices(
        self,
        template: &str,
        mut context: TeraContext,
        notices: Vec<Notice>,
    ) -> Result<Response, WebError> {
        if !context.contains_key("categories") {
            let sidebar = self.state.category_service.list_with_published_counts().await?;
            context.insert("categories", &sidebar);
        }
        if !context.contains_key("current_category_id") {
            context.insert("current_category_id", &0);
        }

        let consumed_flash = !self.flash.is_empty();
        let mut messages = self.flash.0;
        messages.extend(notices);

        let vars = StandardTemplateVars {
            site_name: self.state.site.name.clone(),
            current_user: self.user,
            request_path: self.path,
            messages,
        };
        let html = self
            .state
            .theme
            .render_with_standard_vars(template, &context, &vars)?;

        let mut response = Html(html).into_response();
        if consumed_flash {
            response
                .headers_mut()
                .append(header::SET_COOKIE, clear_flash_cookie());
        }
        Ok(response)
    }
}

/// Build a template context from a serializable value
pub fn context_from<T: Serialize>(value: &T) -> Result<TeraContext, WebError> {
    TeraContext::from_serialize(value)
        .map_err(|e| WebError::Internal(anyhow::anyhow!("Failed to build template context: {}", e)))
}
