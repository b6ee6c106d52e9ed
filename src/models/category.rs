//! Category model

use serde::{Deserialize, Serialize};

/// A news rubric. Every news item belongs to exactly one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    /// Display name, unique across categories
    pub name: String,
}

impl Category {
    /// Create a category that has not been persisted yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0, // Will be set by the database
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Category together with the number of published news items it holds.
///
/// Used by the sidebar, which only lists categories that have something to show.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub published_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_new() {
        let category = Category::new("Politics");
        assert_eq!(category.id, 0);
        assert_eq!(category.name, "Politics");
        assert_eq!(category.to_string(), "Politics");
    }

    #[test]
    fn test_category_with_count_serializes_flat() {
        let entry = CategoryWithCount {
            category: Category { id: 3, name: "Sport".to_string() },
            published_count: 7,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "Sport");
        assert_eq!(json["published_count"], 7);
    }
}
