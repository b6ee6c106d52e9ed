//! Category repository
//!
//! Database operations for categories.
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{Category, CategoryWithCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Category>>;

    /// List all categories ordered by name
    async fn list(&self) -> Result<Vec<Category>>;

    /// List categories holding at least one published news item, with counts
    async fn list_with_published_counts(&self) -> Result<Vec<CategoryWithCount>>;

    /// Check if a category name already exists
    async fn exists_by_name(&self, name: &str) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_category_sqlite(sqlite(&self.pool)?, category).await,
            DatabaseDriver::Mysql => create_category_mysql(mysql(&self.pool)?, category).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let sql = "SELECT id, name FROM categories WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(sql)
                    .bind(id)
                    .fetch_optional(sqlite(&self.pool)?)
                    .await
                    .context("Failed to get category by ID")?;
                row.map(|row| row_to_category_sqlite(&row)).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(sql)
                    .bind(id)
                    .fetch_optional(mysql(&self.pool)?)
                    .await
                    .context("Failed to get category by ID")?;
                row.map(|row| row_to_category_mysql(&row)).transpose()
            }
        }
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Category>> {
        let sql = "SELECT id, name FROM categories WHERE name = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(sql)
                    .bind(name)
                    .fetch_optional(sqlite(&self.pool)?)
                    .await
                    .context("Failed to get category by name")?;
                row.map(|row| row_to_category_sqlite(&row)).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(sql)
                    .bind(name)
                    .fetch_optional(mysql(&self.pool)?)
                    .await
                    .context("Failed to get category by name")?;
                row.map(|row| row_to_category_mysql(&row)).transpose()
            }
        }
    }

    async fn list(&self) -> Result<Vec<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_categories_sqlite(sqlite(&self.pool)?).await,
            DatabaseDriver::Mysql => list_categories_mysql(mysql(&self.pool)?).await,
        }
    }

    async fn list_with_published_counts(&self) -> Result<Vec<CategoryWithCount>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_with_counts_sqlite(sqlite(&self.pool)?).await,
            DatabaseDriver::Mysql => list_with_counts_mysql(mysql(&self.pool)?).await,
        }
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool> {
        Ok(self.get_by_name(name).await?.is_some())
    }
}

const LIST_WITH_COUNTS_SQL: &str = r#"
    SELECT c.id, c.name, COUNT(n.id) AS published_count
    FROM categories c
    INNER JOIN news n ON n.category_id = c.id
    WHERE n.is_published = ?
    GROUP BY c.id, c.name
    ORDER BY c.name
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
        .bind(&category.name)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create category: {}", category.name))?;

    Ok(Category {
        id: result.last_insert_rowid(),
        name: category.name.clone(),
    })
}

async fn list_categories_sqlite(pool: &SqlitePool) -> Result<Vec<Category>> {
    let rows = sqlx::query("SELECT id, name FROM categories ORDER BY name")
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    rows.iter().map(row_to_category_sqlite).collect()
}

async fn list_with_counts_sqlite(pool: &SqlitePool) -> Result<Vec<CategoryWithCount>> {
    let rows = sqlx::query(LIST_WITH_COUNTS_SQL)
        .bind(true)
        .fetch_all(pool)
        .await
        .context("Failed to list categories with counts")?;

    rows.iter()
        .map(|row| {
            Ok(CategoryWithCount {
                category: row_to_category_sqlite(row)?,
                published_count: row.try_get("published_count")?,
            })
        })
        .collect()
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
        .bind(&category.name)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create category: {}", category.name))?;

    Ok(Category {
        id: result.last_insert_id() as i64,
        name: category.name.clone(),
    })
}

async fn list_categories_mysql(pool: &MySqlPool) -> Result<Vec<Category>> {
    let rows = sqlx::query("SELECT id, name FROM categories ORDER BY name")
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    rows.iter().map(row_to_category_mysql).collect()
}

async fn list_with_counts_mysql(pool: &MySqlPool) -> Result<Vec<CategoryWithCount>> {
    let rows = sqlx::query(LIST_WITH_COUNTS_SQL)
        .bind(true)
        .fetch_all(pool)
        .await
        .context("Failed to list categories with counts")?;

    rows.iter()
        .map(|row| {
            Ok(CategoryWithCount {
                category: row_to_category_mysql(row)?,
                published_count: row.try_get("published_count")?,
            })
        })
        .collect()
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}
