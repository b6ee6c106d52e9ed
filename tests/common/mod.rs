//! Shared helpers for router-level tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use tower::ServiceExt;

use newsroom::config::Config;
use newsroom::db::{create_test_pool, migrations};
use newsroom::models::{Category, CreateNewsInput, News};
use newsroom::services::mail::{MailTransport, OutgoingMail};
use newsroom::theme::ThemeEngine;
use newsroom::web::{build_router, AppState};

pub const FROM_ADDRESS: &str = "site@example.com";
pub const RECIPIENT: &str = "desk@example.com";

/// Mail transport that remembers what it was asked to send
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(mail.clone());
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_mailer(RecordingMailer::default()).await
}

pub async fn spawn_app_with_mailer(mailer: RecordingMailer) -> TestApp {
    let pool = create_test_pool().await.unwrap();
    migrations::run_migrations(&pool).await.unwrap();

    let mut config = Config::default();
    config.mail.from_address = FROM_ADDRESS.to_string();
    config.mail.recipient = RECIPIENT.to_string();

    let mailer = Arc::new(mailer);
    let state = AppState::new(pool, &config, ThemeEngine::embedded().unwrap(), mailer.clone());
    let router = build_router(state.clone());

    TestApp {
        router,
        state,
        mailer,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    pub async fn category(&self, name: &str) -> Category {
        self.state.category_service.create(name).await.unwrap()
    }

    pub async fn news(&self, title: &str, category: &Category, published: bool) -> News {
        self.state
            .news_service
            .create(CreateNewsInput::new(title, "Body text", category.id).with_published(published))
            .await
            .unwrap()
    }

    /// Register `username` through the form and return the session cookie pair
    pub async fn register(&self, username: &str, password: &str) -> String {
        let body = format!(
            "username={}&password1={}&password2={}",
            username, password, password
        );
        let response = self.post_form("/register", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        cookie_pair(&response, "session").expect("session cookie")
    }

    pub async fn session_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sessions")
            .fetch_one(self.state.pool.as_sqlite().unwrap())
            .await
            .unwrap()
    }

    pub async fn news_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM news")
            .fetch_one(self.state.pool.as_sqlite().unwrap())
            .await
            .unwrap()
    }
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

/// `name=value` of a cookie set by `response`
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookies(response).into_iter().find_map(|cookie| {
        let pair = cookie.split(';').next()?.to_string();
        pair.starts_with(&format!("{}=", name)).then_some(pair)
    })
}
