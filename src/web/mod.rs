//! Web layer - page handlers and routing
//!
//! Server-rendered HTML pages:
//! - News listings (home and per category), news detail
//! - News creation (login required)
//! - Registration, login and logout
//! - Contact form

pub mod auth;
pub mod contact;
pub mod cookies;
pub mod error;
pub mod flash;
pub mod identity;
pub mod listing;
pub mod middleware;
pub mod news;
pub mod state;
pub mod view;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

pub use error::WebError;
pub use identity::{AuthenticatedUser, CurrentUser};
pub use state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Pages that need a logged-in user
    let protected = Router::new()
        .route("/news/add", get(news::add_form).post(news::add))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_login,
        ));

    Router::new()
        .route("/", get(news::home))
        .route("/category/{id}", get(news::category))
        .route("/news/{id}", get(news::detail))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/contact", get(contact::contact_form).post(contact::contact))
        .merge(protected)
        .fallback(middleware::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::render_error_pages,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
