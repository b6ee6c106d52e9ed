//! Category service
//!
//! Categories are created from configuration at startup; pages only read them.
//! - Lookup and listing
//! - Sidebar listing with published counts
//! - Seeding of configured default categories
//! - Name validation and uniqueness

use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CategoryWithCount};
use anyhow::Context;
use std::sync::Arc;

/// Maximum length of a category name
pub const MAX_CATEGORY_NAME_LEN: usize = 150;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category name already exists
    #[error("Category name already exists: {0}")]
    DuplicateName(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service for managing news categories
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a new category
    ///
    /// # Errors
    /// - `ValidationError` if the name is blank or longer than 150 characters
    /// - `DuplicateName` if a category with the same name already exists
    pub async fn create(&self, name: &str) -> Result<Category, CategoryServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_CATEGORY_NAME_LEN {
            return Err(CategoryServiceError::ValidationError(format!(
                "Category name cannot exceed {} characters",
                MAX_CATEGORY_NAME_LEN
            )));
        }

        if self
            .repo
            .exists_by_name(name)
            .await
            .context("Failed to check name uniqueness")?
        {
            return Err(CategoryServiceError::DuplicateName(name.to_string()));
        }

        let created = self
            .repo
            .create(&Category::new(name))
            .await
            .context("Failed to create category")?;

        Ok(created)
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Category>, CategoryServiceError> {
        let category = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category by ID")?;

        Ok(category)
    }

    /// List all categories ordered by name
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.repo.list().await.context("Failed to list categories")?)
    }

    /// Categories that hold at least one published item, for the sidebar
    pub async fn list_with_published_counts(
        &self,
    ) -> Result<Vec<CategoryWithCount>, CategoryServiceError> {
        let categories = self
            .repo
            .list_with_published_counts()
            .await
            .context("Failed to list categories with counts")?;

        Ok(categories)
    }

    /// Create every configured category that does not exist yet.
    ///
    /// Returns the number of categories created. Blank and duplicate names in
    /// the list are skipped.
    pub async fn ensure_defaults(&self, names: &[String]) -> Result<usize, CategoryServiceError> {
        let mut created = 0;

        for name in names {
            match self.create(name).await {
                Ok(category) => {
                    tracing::info!(id = category.id, name = %category.name, "Created category");
                    created += 1;
                }
                Err(CategoryServiceError::DuplicateName(_)) => {}
                Err(CategoryServiceError::ValidationError(msg)) => {
                    tracing::warn!("Skipping default category {:?}: {}", name, msg);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(created)
    }
}
