//! News repository
//!
//! Database operations for news items.
//!
//! This module provides:
//! - `NewsRepository` trait defining the interface for news data access
//! - `SqlxNewsRepository` implementing the trait for SQLite and MySQL
//!
//! Every read joins the category so pages never issue a second query per row.

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{Category, CreateNewsInput, News, NewsFilter, NewsWithCategory};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Create a new news item
    async fn create(&self, input: &CreateNewsInput) -> Result<News>;

    /// Get a news item with its category, regardless of publication status
    async fn get_with_category(&self, id: i64) -> Result<Option<NewsWithCategory>>;

    /// List published news matching `filter`, newest first
    async fn list_published(
        &self,
        filter: &NewsFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<NewsWithCategory>>;

    /// Count published news matching `filter`
    async fn count_published(&self, filter: &NewsFilter) -> Result<i64>;
}

/// SQLx-based news repository implementation
pub struct SqlxNewsRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsRepository {
    /// Create a new SQLx news repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &CreateNewsInput) -> Result<News> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_news_sqlite(sqlite(&self.pool)?, input).await,
            DatabaseDriver::Mysql => create_news_mysql(mysql(&self.pool)?, input).await,
        }
    }

    async fn get_with_category(&self, id: i64) -> Result<Option<NewsWithCategory>> {
        let sql = format!("{} WHERE n.id = ?", SELECT_WITH_CATEGORY);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(sqlite(&self.pool)?)
                    .await
                    .context("Failed to get news by ID")?;
                row.map(|row| row_to_news_sqlite(&row)).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(mysql(&self.pool)?)
                    .await
                    .context("Failed to get news by ID")?;
                row.map(|row| row_to_news_mysql(&row)).transpose()
            }
        }
    }

    async fn list_published(
        &self,
        filter: &NewsFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<NewsWithCategory>> {
        let sql = format!(
            "{} {} ORDER BY n.created_at DESC, n.id DESC LIMIT ? OFFSET ?",
            SELECT_WITH_CATEGORY, PUBLISHED_FILTER
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .bind(true)
                    .bind(filter.category_id)
                    .bind(filter.category_id)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(sqlite(&self.pool)?)
                    .await
                    .context("Failed to list published news")?;
                rows.iter().map(row_to_news_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .bind(true)
                    .bind(filter.category_id)
                    .bind(filter.category_id)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(mysql(&self.pool)?)
                    .await
                    .context("Failed to list published news")?;
                rows.iter().map(row_to_news_mysql).collect()
            }
        }
    }

    async fn count_published(&self, filter: &NewsFilter) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) AS count FROM news n {}", PUBLISHED_FILTER);
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(&sql)
                .bind(true)
                .bind(filter.category_id)
                .bind(filter.category_id)
                .fetch_one(sqlite(&self.pool)?)
                .await
                .context("Failed to count published news")?
                .try_get("count")?,
            DatabaseDriver::Mysql => sqlx::query(&sql)
                .bind(true)
                .bind(filter.category_id)
                .bind(filter.category_id)
                .fetch_one(mysql(&self.pool)?)
                .await
                .context("Failed to count published news")?
                .try_get("count")?,
        };
        Ok(count)
    }
}

const SELECT_WITH_CATEGORY: &str = r#"
    SELECT n.id, n.title, n.content, n.created_at, n.updated_at, n.is_published,
           n.category_id, c.name AS category_name
    FROM news n
    INNER JOIN categories c ON c.id = n.category_id
"#;

// Binds: is_published, category_id, category_id
const PUBLISHED_FILTER: &str = "WHERE n.is_published = ? AND (? IS NULL OR n.category_id = ?)";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_news_sqlite(pool: &SqlitePool, input: &CreateNewsInput) -> Result<News> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO news (title, content, created_at, updated_at, is_published, category_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(now)
    .bind(now)
    .bind(input.is_published)
    .bind(input.category_id)
    .execute(pool)
    .await
    .context("Failed to create news")?;

    Ok(news_from_input(result.last_insert_rowid(), input, now))
}

fn row_to_news_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<NewsWithCategory> {
    let category_id: i64 = row.try_get("category_id")?;
    Ok(NewsWithCategory {
        news: News {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            is_published: row.try_get("is_published")?,
            category_id,
        },
        category: Category {
            id: category_id,
            name: row.try_get("category_name")?,
        },
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_news_mysql(pool: &MySqlPool, input: &CreateNewsInput) -> Result<News> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO news (title, content, created_at, updated_at, is_published, category_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(now)
    .bind(now)
    .bind(input.is_published)
    .bind(input.category_id)
    .execute(pool)
    .await
    .context("Failed to create news")?;

    Ok(news_from_input(result.last_insert_id() as i64, input, now))
}

fn row_to_news_mysql(row: &sqlx::mysql::MySqlRow) -> Result<NewsWithCategory> {
    let category_id: i64 = row.try_get("category_id")?;
    Ok(NewsWithCategory {
        news: News {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            is_published: row.try_get("is_published")?,
            category_id,
        },
        category: Category {
            id: category_id,
            name: row.try_get("category_name")?,
        },
    })
}

fn news_from_input(id: i64, input: &CreateNewsInput, now: chrono::DateTime<Utc>) -> News {
    News {
        id,
        title: input.title.clone(),
        content: input.content.clone(),
        created_at: now,
        updated_at: now,
        is_published: input.is_published,
        category_id: input.category_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{CategoryRepository, SqlxCategoryRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (SqlxNewsRepository, Category, Category) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let categories = SqlxCategoryRepository::new(pool.clone());
        let sport = categories.create(&Category::new("Sport")).await.unwrap();
        let culture = categories.create(&Category::new("Culture")).await.unwrap();

        (SqlxNewsRepository::new(pool), sport, culture)
    }

    #[tokio::test]
    async fn test_create_and_get_news() {
        let (repo, sport, _) = setup_test_repo().await;

        let created = repo
            .create(&CreateNewsInput::new("Final score", "3:1", sport.id))
            .await
            .expect("Failed to create news");
        assert!(created.id > 0);
        assert!(created.is_published);

        let found = repo
            .get_with_category(created.id)
            .await
            .unwrap()
            .expect("News not found");
        assert_eq!(found.news.title, "Final score");
        assert_eq!(found.news.content, "3:1");
        assert_eq!(found.category, sport);
    }

    #[tokio::test]
    async fn test_get_unpublished_news_by_id() {
        let (repo, sport, _) = setup_test_repo().await;
        let created = repo
            .create(&CreateNewsInput::new("Draft", "", sport.id).with_published(false))
            .await
            .unwrap();

        let found = repo.get_with_category(created.id).await.unwrap().expect("draft");
        assert!(!found.news.is_published);
        assert!(repo.get_with_category(created.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_with_unknown_category_fails() {
        let (repo, _, _) = setup_test_repo().await;
        assert!(repo.create(&CreateNewsInput::new("Orphan", "", 999)).await.is_err());
    }

    #[tokio::test]
    async fn test_list_published_filters_and_orders() {
        let (repo, sport, culture) = setup_test_repo().await;

        let first = repo.create(&CreateNewsInput::new("first", "", sport.id)).await.unwrap();
        repo.create(&CreateNewsInput::new("hidden", "", sport.id).with_published(false))
            .await
            .unwrap();
        let second = repo.create(&CreateNewsInput::new("second", "", culture.id)).await.unwrap();
        let third = repo.create(&CreateNewsInput::new("third", "", sport.id)).await.unwrap();

        let all = repo.list_published(&NewsFilter::published(), 0, 10).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|n| n.news.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
        assert_eq!(repo.count_published(&NewsFilter::published()).await.unwrap(), 3);

        let filter = NewsFilter::in_category(sport.id);
        let in_sport = repo.list_published(&filter, 0, 10).await.unwrap();
        let ids: Vec<i64> = in_sport.iter().map(|n| n.news.id).collect();
        assert_eq!(ids, vec![third.id, first.id]);
        assert_eq!(repo.count_published(&filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_published_pages() {
        let (repo, sport, _) = setup_test_repo().await;
        for i in 0..5 {
            repo.create(&CreateNewsInput::new(format!("n{}", i), "", sport.id))
                .await
                .unwrap();
        }

        let filter = NewsFilter::published();
        assert_eq!(repo.list_published(&filter, 0, 2).await.unwrap().len(), 2);
        assert_eq!(repo.list_published(&filter, 2, 2).await.unwrap().len(), 2);
        assert_eq!(repo.list_published(&filter, 4, 2).await.unwrap().len(), 1);
        assert!(repo.list_published(&filter, 6, 2).await.unwrap().is_empty());
    }
}
