//! News creation form

use serde::{Deserialize, Serialize};

use super::{clean_text, FormErrors, FormView, REQUIRED};
use crate::models::{Category, CreateNewsInput};
use crate::services::news::MAX_TITLE_LEN;

pub const TITLE_STARTS_WITH_DIGIT: &str = "Title must not start with a digit.";
pub const INVALID_CATEGORY: &str =
    "Select a valid choice. That choice is not one of the available choices.";

pub const NEWS_FORM_FIELDS: &[&str] = &["title", "content", "is_published", "category"];

/// Raw news submission.
///
/// An unchecked checkbox is simply missing from the body, so `is_published`
/// is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewsForm {
    pub title: String,
    pub content: String,
    pub is_published: Option<String>,
    pub category: String,
}

/// One entry of the category drop-down
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChoice {
    pub id: i64,
    pub name: String,
    pub selected: bool,
}

impl NewsForm {
    /// Validate against the categories that currently exist
    pub fn validate(&self, categories: &[Category]) -> Result<CreateNewsInput, FormErrors> {
        let mut errors = FormErrors::new();

        let title = clean_text(&mut errors, "title", &self.title, Some(MAX_TITLE_LEN), true);
        if title.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            errors.add("title", TITLE_STARTS_WITH_DIGIT);
        }

        let content = clean_text(&mut errors, "content", &self.content, None, false);

        let category_id = match self.category.trim() {
            "" => {
                errors.add("category", REQUIRED);
                0
            }
            raw => match raw.parse::<i64>() {
                Ok(id) if categories.iter().any(|c| c.id == id) => id,
                _ => {
                    errors.add("category", INVALID_CATEGORY);
                    0
                }
            },
        };

        errors.into_result(CreateNewsInput {
            title,
            content,
            is_published: self.is_published(),
            category_id,
        })
    }

    /// Checkbox semantics: missing, empty or "false" means unchecked
    pub fn is_published(&self) -> bool {
        match self.is_published.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(value) => !value.eq_ignore_ascii_case("false"),
        }
    }

    pub fn view(&self, errors: &FormErrors) -> FormView {
        FormView::empty(NEWS_FORM_FIELDS)
            .with_value("title", &self.title)
            .with_value("content", &self.content)
            .with_value("is_published", if self.is_published() { "on" } else { "" })
            .with_value("category", self.category.trim())
            .with_errors(errors)
    }

    /// A fresh form: published is checked by default
    pub fn initial_view() -> FormView {
        FormView::empty(NEWS_FORM_FIELDS).with_value("is_published", "on")
    }
}

/// Drop-down entries with the submitted category preselected
pub fn category_choices(categories: &[Category], selected: &str) -> Vec<CategoryChoice> {
    let selected = selected.trim();
    categories
        .iter()
        .map(|c| CategoryChoice {
            id: c.id,
            name: c.name.clone(),
            selected: c.id.to_string() == selected,
        })
        .collect()
}
