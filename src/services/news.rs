//! News service
//!
//! Implements business logic for news items:
//! - Creation with validation and category checks
//! - Single item lookup
//! - Paginated, publication-filtered listings

use crate::db::repositories::{CategoryRepository, NewsRepository};
use crate::models::{
    resolve_page, CreateNewsInput, InvalidPage, ListParams, News, NewsFilter, NewsWithCategory,
    PagedResult,
};
use anyhow::Context;
use std::sync::Arc;

/// Default number of items per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 2;

/// Maximum length of a news title
pub const MAX_TITLE_LEN: usize = 150;

/// Error types for news service operations
#[derive(Debug, thiserror::Error)]
pub enum NewsServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Referenced category does not exist
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// Requested listing page does not exist
    #[error(transparent)]
    InvalidPage(#[from] InvalidPage),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// News service
pub struct NewsService {
    repo: Arc<dyn NewsRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    page_size: u32,
}

impl NewsService {
    /// Create a new news service with the default page size
    pub fn new(repo: Arc<dyn NewsRepository>, category_repo: Arc<dyn CategoryRepository>) -> Self {
        Self::with_page_size(repo, category_repo, DEFAULT_PAGE_SIZE)
    }

    /// Create a new news service with a custom page size
    pub fn with_page_size(
        repo: Arc<dyn NewsRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        page_size: u32,
    ) -> Self {
        Self {
            repo,
            category_repo,
            page_size: page_size.max(1),
        }
    }

    /// Create a news item
    ///
    /// # Errors
    /// - `ValidationError` if the title is blank, too long or starts with a digit
    /// - `CategoryNotFound` if the category does not exist
    pub async fn create(&self, mut input: CreateNewsInput) -> Result<News, NewsServiceError> {
        input.title = input.title.trim().to_string();
        validate_title(&input.title).map_err(NewsServiceError::ValidationError)?;

        if self
            .category_repo
            .get_by_id(input.category_id)
            .await
            .context("Failed to check category")?
            .is_none()
        {
            return Err(NewsServiceError::CategoryNotFound(input.category_id));
        }

        let news = self
            .repo
            .create(&input)
            .await
            .context("Failed to create news")?;

        tracing::info!(
            id = news.id,
            category_id = news.category_id,
            published = news.is_published,
            "Created news item"
        );
        Ok(news)
    }

    /// Get a news item with its category. Unpublished items are returned too.
    pub async fn get(&self, id: i64) -> Result<Option<NewsWithCategory>, NewsServiceError> {
        let news = self
            .repo
            .get_with_category(id)
            .await
            .context("Failed to get news by ID")?;

        Ok(news)
    }

    /// List one page of published news matching `filter`, newest first.
    ///
    /// `page` is the raw `?page=` value; see [`resolve_page`] for how it is
    /// interpreted.
    pub async fn list_published(
        &self,
        filter: &NewsFilter,
        page: Option<&str>,
    ) -> Result<PagedResult<NewsWithCategory>, NewsServiceError> {
        let total = self
            .repo
            .count_published(filter)
            .await
            .context("Failed to count published news")?;

        let page = resolve_page(page, total, self.page_size)?;
        let params = ListParams::new(page, self.page_size);

        let items = if total == 0 {
            Vec::new()
        } else {
            self.repo
                .list_published(filter, params.offset(), params.limit())
                .await
                .context("Failed to list published news")?
        };

        Ok(PagedResult::new(items, total, &params))
    }
}

/// Check a news title, returning a message describing the first problem.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!("Title cannot exceed {} characters", MAX_TITLE_LEN));
    }
    if title.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return Err("Title must not start with a digit".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxCategoryRepository, SqlxNewsRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::Category;

    async fn setup_test_service() -> (NewsService, Category) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let sport = category_repo.create(&Category::new("Sport")).await.unwrap();
        let service = NewsService::new(SqlxNewsRepository::boxed(pool), category_repo);

        (service, sport)
    }

    #[tokio::test]
    async fn test_create_news() {
        let (service, sport) = setup_test_service().await;

        let news = service
            .create(CreateNewsInput::new("  Match report ", "", sport.id))
            .await
            .expect("Failed to create news");

        assert_eq!(news.title, "Match report");
        assert!(news.is_published);

        let found = service.get(news.id).await.unwrap().expect("found");
        assert_eq!(found.category.name, "Sport");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_title_and_category() {
        let (service, sport) = setup_test_service().await;

        assert!(matches!(
            service.create(CreateNewsInput::new("1st place", "", sport.id)).await,
            Err(NewsServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.create(CreateNewsInput::new("", "", sport.id)).await,
            Err(NewsServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.create(CreateNewsInput::new("Fine", "", 404)).await,
            Err(NewsServiceError::CategoryNotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_list_published_pages() {
        let (service, sport) = setup_test_service().await;
        for title in ["a", "b", "c"] {
            service
                .create(CreateNewsInput::new(title, "", sport.id))
                .await
                .unwrap();
        }
        service
            .create(CreateNewsInput::new("draft", "", sport.id).with_published(false))
            .await
            .unwrap();

        let filter = NewsFilter::published();
        let first = service.list_published(&filter, None).await.unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.items[0].news.title, "c");
        assert!(first.has_next());

        let second = service.list_published(&filter, Some("2")).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].news.title, "a");
        assert!(!second.has_next());

        assert!(matches!(
            service.list_published(&filter, Some("3")).await,
            Err(NewsServiceError::InvalidPage(_))
        ));
        assert!(matches!(
            service.list_published(&filter, Some("two")).await,
            Err(NewsServiceError::InvalidPage(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_listing_has_a_first_page() {
        let (service, _) = setup_test_service().await;

        let page = service
            .list_published(&NewsFilter::published(), Some("1"))
            .await
            .expect("page 1 of an empty listing");
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Budget approved").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("2024 in review").is_err());
        assert!(validate_title(&"t".repeat(150)).is_ok());
        assert!(validate_title(&"t".repeat(151)).is_err());
    }
}
