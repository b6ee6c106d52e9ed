//! HTML form handling
//!
//! Each form deserializes from `application/x-www-form-urlencoded` input,
//! validates its fields and either yields clean data or a set of
//! [`FormErrors`]. A [`FormView`] carries values and errors back to the
//! template when the form has to be shown again.

use serde::Serialize;
use std::collections::BTreeMap;

pub mod contact;
pub mod login;
pub mod news;
pub mod register;

pub use contact::{ContactData, ContactForm};
pub use login::LoginForm;
pub use news::{NewsForm, NEWS_FORM_FIELDS};
pub use register::{RegisterData, RegisterForm};

pub const REQUIRED: &str = "This field is required.";

/// Message for a value longer than `max` characters
pub fn max_length_message(max: usize, actual: usize) -> String {
    format!(
        "Ensure this value has at most {} characters (it has {}).",
        max, actual
    )
}

/// Field-level and form-level validation errors
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub non_field: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an error to a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Attach an error to the form as a whole
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.non_field.is_empty() && self.fields.values().all(Vec::is_empty)
    }

    pub fn has_field_error(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|errors| !errors.is_empty())
    }

    /// Errors of one field
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(data)` when nothing was reported
    pub fn into_result<T>(self, data: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(data)
        } else {
            Err(self)
        }
    }
}

/// Template view of a form: submitted values plus errors.
///
/// Every declared field is present in both maps so templates can index them
/// without guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub values: BTreeMap<String, String>,
    pub errors: BTreeMap<String, Vec<String>>,
    pub non_field_errors: Vec<String>,
}

impl FormView {
    /// An unbound form with the given fields
    pub fn empty(fields: &[&str]) -> Self {
        Self {
            values: fields.iter().map(|f| (f.to_string(), String::new())).collect(),
            errors: fields.iter().map(|f| (f.to_string(), Vec::new())).collect(),
            non_field_errors: Vec::new(),
        }
    }

    pub fn with_value(mut self, field: &str, value: impl Into<String>) -> Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    pub fn with_errors(mut self, errors: &FormErrors) -> Self {
        for (field, messages) in &errors.fields {
            self.errors
                .entry(field.clone())
                .or_default()
                .extend(messages.iter().cloned());
        }
        self.non_field_errors.extend(errors.non_field.iter().cloned());
        self
    }
}

/// Clean a text field: trim it, then check presence and length.
pub(crate) fn clean_text(
    errors: &mut FormErrors,
    field: &str,
    raw: &str,
    max_len: Option<usize>,
    required: bool,
) -> String {
    let value = raw.trim().to_string();

    if value.is_empty() {
        if required {
            errors.add(field, REQUIRED);
        }
        return value;
    }

    if let Some(max) = max_len {
        let len = value.chars().count();
        if len > max {
            errors.add(field, max_length_message(max, len));
        }
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_errors_collect() {
        let mut errors = FormErrors::new();
        assert!(errors.is_empty());

        errors.add("title", REQUIRED);
        errors.add("title", "Another");
        errors.add_non_field("Whole form is wrong");

        assert!(!errors.is_empty());
        assert!(errors.has_field_error("title"));
        assert!(!errors.has_field_error("content"));
        assert_eq!(errors.field("title").len(), 2);
        assert!(errors.field("content").is_empty());
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_clean_text() {
        let mut errors = FormErrors::new();
        assert_eq!(clean_text(&mut errors, "a", "  hi  ", Some(5), true), "hi");
        assert!(errors.is_empty());

        clean_text(&mut errors, "b", "   ", Some(5), true);
        assert_eq!(errors.field("b"), &[REQUIRED.to_string()]);

        clean_text(&mut errors, "c", "", None, false);
        assert!(!errors.has_field_error("c"));

        clean_text(&mut errors, "d", "ääääää", Some(5), true);
        assert_eq!(errors.field("d"), &[max_length_message(5, 6)]);
    }

    #[test]
    fn test_form_view_has_every_field() {
        let mut errors = FormErrors::new();
        errors.add("subject", REQUIRED);
        errors.add_non_field("Oops");

        let view = FormView::empty(&["subject", "content"])
            .with_value("content", "text")
            .with_errors(&errors);

        assert_eq!(view.values["subject"], "");
        assert_eq!(view.values["content"], "text");
        assert_eq!(view.errors["subject"], vec![REQUIRED.to_string()]);
        assert!(view.errors["content"].is_empty());
        assert_eq!(view.non_field_errors, vec!["Oops".to_string()]);
    }
}
