//! Registration, login and logout pages

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tera::Context as TeraContext;

use super::cookies::{clear_session_cookie, session_cookie, session_token};
use super::error::WebError;
use super::flash::push_flash;
use super::middleware::LOGIN_PATH;
use super::state::AppState;
use super::view::View;
use crate::forms::login::safe_next;
use crate::forms::{FormView, LoginForm, RegisterForm};
use crate::models::Session;
use crate::services::user::{LoginInput, RegisterInput, UserServiceError};
use crate::theme::Notice;

pub const REGISTER_SUCCESS: &str = "Registration successful.";
pub const REGISTER_FAILED: &str = "Registration failed. Please correct the errors below.";
pub const LOGIN_SUCCESS: &str = "You are now logged in.";
pub const LOGIN_FAILED: &str = "Invalid username or password.";

/// `?next=` of the login page
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// GET /register
pub async fn register_form(view: View) -> Result<Response, WebError> {
    render_register(view, RegisterForm::empty_view(), Vec::new()).await
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    view: View,
    Form(form): Form<RegisterForm>,
) -> Result<Response, WebError> {
    let data = match form.validate() {
        Ok(data) => data,
        Err(errors) => {
            return render_register(view, form.view(&errors), vec![Notice::error(REGISTER_FAILED)])
                .await
        }
    };

    let user = match state
        .user_service
        .register(RegisterInput::new(data.username, data.password))
        .await
    {
        Ok(user) => user,
        Err(UserServiceError::UserExists(_)) => {
            let errors = RegisterForm::username_taken();
            return render_register(view, form.view(&errors), vec![Notice::error(REGISTER_FAILED)])
                .await;
        }
        Err(e) => return Err(e.into()),
    };

    let session = state.user_service.start_session(user.id).await?;
    Ok(logged_in_redirect("/", &session, REGISTER_SUCCESS))
}

/// GET /login
pub async fn login_form(view: View, Query(query): Query<NextQuery>) -> Result<Response, WebError> {
    let next = safe_next(query.next.as_deref()).map(str::to_string);
    render_login(view, LoginForm::empty_view(), next, Vec::new()).await
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    view: View,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let next = safe_next(form.next.as_deref()).map(str::to_string);

    let (username, password) = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            return render_login(view, form.view(&errors), next, vec![Notice::error(LOGIN_FAILED)])
                .await
        }
    };

    match state
        .user_service
        .login(LoginInput::new(username, password))
        .await
    {
        Ok((_, session)) => {
            let target = next.as_deref().unwrap_or("/");
            Ok(logged_in_redirect(target, &session, LOGIN_SUCCESS))
        }
        Err(UserServiceError::InvalidCredentials) => {
            let errors = LoginForm::invalid_credentials();
            render_login(view, form.view(&errors), next, vec![Notice::error(LOGIN_FAILED)]).await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET|POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, WebError> {
    if let Some(token) = session_token(&headers) {
        state.user_service.logout(&token).await?;
    }

    let mut response = Redirect::to(LOGIN_PATH).into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, clear_session_cookie());
    Ok(response)
}

/// Redirect to `target` carrying the new session cookie and a success notice
fn logged_in_redirect(target: &str, session: &Session, notice: &str) -> Response {
    let mut response = Redirect::to(target).into_response();
    if let Some(cookie) = session_cookie(session) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    push_flash(response.headers_mut(), &[Notice::success(notice)]);
    response
}

async fn render_register(
    view: View,
    form: FormView,
    notices: Vec<Notice>,
) -> Result<Response, WebError> {
    let mut context = TeraContext::new();
    context.insert("title", "Register");
    context.insert("form", &form);
    view.render_with_notices("news/register.html", context, notices)
        .await
}

async fn render_login(
    view: View,
    form: FormView,
    next: Option<String>,
    notices: Vec<Notice>,
) -> Result<Response, WebError> {
    let mut context = TeraContext::new();
    context.insert("title", "Login");
    context.insert("form", &form);
    context.insert("next", &next);
    view.render_with_notices("news/login.html", context, notices)
        .await
}
