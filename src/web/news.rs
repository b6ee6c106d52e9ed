//! News pages: listings, detail and creation

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tera::Context as TeraContext;

use super::error::WebError;
use super::identity::AuthenticatedUser;
use super::listing::compose_listing;
use super::state::AppState;
use super::view::{context_from, View};
use crate::forms::news::{category_choices, NewsForm, INVALID_CATEGORY};
use crate::forms::{FormErrors, FormView};
use crate::models::{Category, NewsFilter};
use crate::services::news::NewsServiceError;

/// `?page=` of the listings, kept raw so bad values can be reported as not found
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// A query string that does not deserialize (e.g. a repeated `page`) names no page
impl<S: Send + Sync> FromRequestParts<S> for PageQuery {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| WebError::not_found(format!("query: {}", e.body_text())))?;
        Ok(query)
    }
}

/// Parse an id path segment. Only plain digits name a resource.
pub fn parse_id(raw: &str) -> Result<i64, WebError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WebError::not_found(format!("id {:?}", raw)));
    }
    raw.parse::<i64>()
        .map_err(|_| WebError::not_found(format!("id {:?}", raw)))
}

/// GET / - published news, newest first
pub async fn home(
    State(state): State<AppState>,
    query: PageQuery,
    view: View,
) -> Result<Response, WebError> {
    let page = state
        .news_service
        .list_published(&NewsFilter::published(), query.page.as_deref())
        .await?;
    let sidebar = state.category_service.list_with_published_counts().await?;

    let listing = compose_listing(page, None, sidebar);
    view.render("news/index.html", context_from(&listing)?).await
}

/// GET /category/{id} - published news of one category
pub async fn category(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    query: PageQuery,
    view: View,
) -> Result<Response, WebError> {
    let id = parse_id(&raw_id)?;
    let category = state
        .category_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| WebError::not_found(format!("category {}", id)))?;

    let page = state
        .news_service
        .list_published(&NewsFilter::in_category(category.id), query.page.as_deref())
        .await?;
    let sidebar = state.category_service.list_with_published_counts().await?;

    let listing = compose_listing(page, Some(&category), sidebar);
    view.render("news/index.html", context_from(&listing)?).await
}

/// GET /news/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    view: View,
) -> Result<Response, WebError> {
    let id = parse_id(&raw_id)?;
    let item = state
        .news_service
        .get(id)
        .await?
        .ok_or_else(|| WebError::not_found(format!("news {}", id)))?;

    let mut context = TeraContext::new();
    context.insert("title", &item.news.title);
    context.insert("news_item", &item);
    view.render("news/view_news.html", context).await
}

/// GET /news/add
pub async fn add_form(State(state): State<AppState>, view: View) -> Result<Response, WebError> {
    let categories = state.category_service.list().await?;
    render_news_form(view, NewsForm::initial_view(), &categories, "").await
}

/// POST /news/add
pub async fn add(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    view: View,
    Form(form): Form<NewsForm>,
) -> Result<Response, WebError> {
    let categories = state.category_service.list().await?;

    let input = match form.validate(&categories) {
        Ok(input) => input,
        Err(errors) => {
            return render_news_form(view, form.view(&errors), &categories, &form.category).await
        }
    };

    let mut errors = FormErrors::new();
    match state.news_service.create(input).await {
        Ok(news) => {
            tracing::info!(id = news.id, user = %user.username, "News item added");
            return Ok(Redirect::to(&news.url()).into_response());
        }
        // The category vanished between validation and insert
        Err(NewsServiceError::CategoryNotFound(_)) => errors.add("category", INVALID_CATEGORY),
        Err(NewsServiceError::ValidationError(message)) => errors.add("title", message),
        Err(e) => return Err(e.into()),
    }

    render_news_form(view, form.view(&errors), &categories, &form.category).await
}

async fn render_news_form(
    view: View,
    form: FormView,
    categories: &[Category],
    selected: &str,
) -> Result<Response, WebError> {
    let mut context = TeraContext::new();
    context.insert("title", "Add news");
    context.insert("form", &form);
    context.insert("category_choices", &category_choices(categories, selected));
    view.render("news/add_news.html", context).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("007").unwrap(), 7);
        assert!(parse_id("").is_err());
        assert!(parse_id("-1").is_err());
        assert!(parse_id("4x").is_err());
        assert!(parse_id("99999999999999999999").is_err());
    }
}
