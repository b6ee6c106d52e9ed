//! Shared application state

use std::sync::Arc;

use chrono::Duration;

use crate::config::{Config, SiteConfig};
use crate::db::repositories::{
    SqlxCategoryRepository, SqlxNewsRepository, SqlxSessionRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::services::category::CategoryService;
use crate::services::mail::{MailService, MailTransport};
use crate::services::news::NewsService;
use crate::services::user::UserService;
use crate::theme::ThemeEngine;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub user_service: Arc<UserService>,
    pub news_service: Arc<NewsService>,
    pub category_service: Arc<CategoryService>,
    pub mail_service: Arc<MailService>,
    pub theme: Arc<ThemeEngine>,
    pub site: Arc<SiteConfig>,
}

impl AppState {
    /// Wire repositories and services over `pool`.
    pub fn new(
        pool: DynDatabasePool,
        config: &Config,
        theme: ThemeEngine,
        mail_transport: Arc<dyn MailTransport>,
    ) -> Self {
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let news_repo = SqlxNewsRepository::boxed(pool.clone());

        let user_service = UserService::with_session_lifetime(
            user_repo,
            session_repo,
            Duration::days(config.session.lifetime_days),
        );
        let news_service =
            NewsService::with_page_size(news_repo, category_repo.clone(), config.site.page_size);
        let category_service = CategoryService::new(category_repo);
        let mail_service = MailService::from_config(mail_transport, &config.mail);

        Self {
            pool,
            user_service: Arc::new(user_service),
            news_service: Arc::new(news_service),
            category_service: Arc::new(category_service),
            mail_service: Arc::new(mail_service),
            theme: Arc::new(theme),
            site: Arc::new(config.site.clone()),
        }
    }
}
