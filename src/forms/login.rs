//! Login form

use serde::Deserialize;

use super::{FormErrors, FormView, REQUIRED};

pub const INVALID_LOGIN: &str = "Please enter a correct username and password.";

const FIELDS: &[&str] = &["username", "password"];

/// Raw login submission
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Where to go after a successful login
    pub next: Option<String>,
}

impl LoginForm {
    /// Check that both fields were filled in. Credentials are checked by the
    /// user service.
    pub fn validate(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::new();

        let username = self.username.trim().to_string();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        }
        // Passwords are taken verbatim
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        errors.into_result((username, self.password.clone()))
    }

    /// Errors for rejected credentials
    pub fn invalid_credentials() -> FormErrors {
        let mut errors = FormErrors::new();
        errors.add_non_field(INVALID_LOGIN);
        errors
    }

    /// The password is never echoed back
    pub fn view(&self, errors: &FormErrors) -> FormView {
        FormView::empty(FIELDS)
            .with_value("username", &self.username)
            .with_errors(errors)
    }

    pub fn empty_view() -> FormView {
        FormView::empty(FIELDS)
    }
}

/// Accept a post-login redirect target only if it stays on this site.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim)
        .filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}
