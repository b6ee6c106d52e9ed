//! Contact form

use serde::Deserialize;

use super::{clean_text, FormErrors, FormView};

pub const MAX_SUBJECT_LEN: usize = 255;

const FIELDS: &[&str] = &["subject", "content"];

/// Raw contact submission
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub subject: String,
    pub content: String,
}

/// Validated contact message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactData {
    pub subject: String,
    pub content: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<ContactData, FormErrors> {
        let mut errors = FormErrors::new();

        let subject = clean_text(&mut errors, "subject", &self.subject, Some(MAX_SUBJECT_LEN), true);
        let content = clean_text(&mut errors, "content", &self.content, None, true);

        errors.into_result(ContactData { subject, content })
    }

    pub fn view(&self, errors: &FormErrors) -> FormView {
        FormView::empty(FIELDS)
            .with_value("subject", &self.subject)
            .with_value("content", &self.content)
            .with_errors(errors)
    }

    pub fn empty_view() -> FormView {
        FormView::empty(FIELDS)
    }
}
