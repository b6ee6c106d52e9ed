//! News model
//!
//! - `News`: a stored news item
//! - `NewsWithCategory`: a news item joined with its category, as shown on pages
//! - `CreateNewsInput`: validated data for a new item
//! - `NewsFilter`: criteria for the public listings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Category;

/// News entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct News {
    pub id: i64,
    pub title: String,
    /// Body text, may be empty
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Only published items appear in listings
    pub is_published: bool,
    pub category_id: i64,
}

impl News {
    /// Canonical page of this item
    pub fn url(&self) -> String {
        format!("/news/{}", self.id)
    }
}

/// News item joined with its category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsWithCategory {
    #[serde(flatten)]
    pub news: News,
    pub category: Category,
}

/// Input for creating a news item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNewsInput {
    pub title: String,
    pub content: String,
    pub is_published: bool,
    pub category_id: i64,
}

impl CreateNewsInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>, category_id: i64) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            is_published: true,
            category_id,
        }
    }

    /// Set the publication flag
    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }
}

/// Filter for the public listings.
///
/// Listings always restrict to published items; the category is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewsFilter {
    pub category_id: Option<i64>,
}

impl NewsFilter {
    /// Every published item
    pub fn published() -> Self {
        Self { category_id: None }
    }

    /// Published items of one category
    pub fn in_category(category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_defaults_to_published() {
        let input = CreateNewsInput::new("Title", "Body", 1);
        assert!(input.is_published);
        assert!(!input.with_published(false).is_published);
    }

    #[test]
    fn test_news_url() {
        let now = Utc::now();
        let news = News {
            id: 17,
            title: "t".to_string(),
            content: String::new(),
            created_at: now,
            updated_at: now,
            is_published: true,
            category_id: 1,
        };
        assert_eq!(news.url(), "/news/17");
    }

    #[test]
    fn test_filters() {
        assert_eq!(NewsFilter::published().category_id, None);
        assert_eq!(NewsFilter::in_category(4).category_id, Some(4));
    }
}
