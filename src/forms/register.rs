//! Registration form
//!
//! Username rules and password checks follow the usual account conventions:
//! a short username of word characters and `@.+-`, a confirmed password of at
//! least eight characters that is neither all digits nor a near copy of the
//! username.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{clean_text, FormErrors, FormView, REQUIRED};

pub const MAX_USERNAME_LEN: usize = 150;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Ratio at or above which a password counts as too similar to the username
const MAX_SIMILARITY: f64 = 0.7;

pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const PASSWORD_ENTIRELY_NUMERIC: &str = "This password is entirely numeric.";
pub const PASSWORD_TOO_SIMILAR: &str = "The password is too similar to the username.";

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex"));
static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid regex"));

const FIELDS: &[&str] = &["username", "password1", "password2"];

/// Raw registration submission
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

/// Validated registration data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterData {
    pub username: String,
    pub password: String,
}

impl RegisterForm {
    /// Validate syntax and password rules. Username uniqueness is checked
    /// against the database by the user service.
    pub fn validate(&self) -> Result<RegisterData, FormErrors> {
        let mut errors = FormErrors::new();

        let username = clean_text(
            &mut errors,
            "username",
            &self.username,
            Some(MAX_USERNAME_LEN),
            true,
        );
        if !username.is_empty() && !USERNAME_RE.is_match(&username) {
            errors.add("username", INVALID_USERNAME);
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        }

        if !self.password1.is_empty() && !self.password2.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", PASSWORD_MISMATCH);
            } else {
                for message in password_problems(&self.password2, &username) {
                    errors.add("password2", message);
                }
            }
        }

        errors.into_result(RegisterData {
            username,
            password: self.password1.clone(),
        })
    }

    /// Errors for a username that is already registered
    pub fn username_taken() -> FormErrors {
        let mut errors = FormErrors::new();
        errors.add("username", USERNAME_TAKEN);
        errors
    }

    /// Passwords are never echoed back
    pub fn view(&self, errors: &FormErrors) -> FormView {
        FormView::empty(FIELDS)
            .with_value("username", &self.username)
            .with_errors(errors)
    }

    pub fn empty_view() -> FormView {
        FormView::empty(FIELDS)
    }
}

/// Password strength problems, in display order
pub fn password_problems(password: &str, username: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if is_too_similar(password, username) {
        problems.push(PASSWORD_TOO_SIMILAR.to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LEN
        ));
    }

    if !password.is_empty() && password.chars().all(char::is_numeric) {
        problems.push(PASSWORD_ENTIRELY_NUMERIC.to_string());
    }

    problems
}

/// Compare the password against the whole username and against each of its
/// word-separated parts.
fn is_too_similar(password: &str, username: &str) -> bool {
    if username.is_empty() {
        return false;
    }

    let password = password.to_lowercase();
    let username = username.to_lowercase();

    NON_WORD_RE
        .split(&username)
        .chain(std::iter::once(username.as_str()))
        .filter(|part| !part.is_empty())
        .any(|part| {
            let (pwd_len, part_len) = (password.chars().count(), part.chars().count());
            // A password far longer than the attribute cannot reach the ratio
            if pwd_len >= 10 * part_len && (part_len as f64) < MAX_SIMILARITY * pwd_len as f64 {
                return false;
            }
            similarity(&password, part) >= MAX_SIMILARITY
        })
}

/// Ratcliff/Obershelp similarity: `2 * matches / (len(a) + len(b))`
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_common_run(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + len..], &b[j + len..])
}

/// Longest common substring as (start in a, start in b, length)
fn longest_common_run(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        let mut row = vec![0usize; b.len() + 1];
        for j in 1..=b.len() {
            if a[i - 1] == b[j - 1] {
                row[j] = prev[j - 1] + 1;
                if row[j] > best.2 {
                    best = (i - row[j], j - row[j], row[j]);
                }
            }
        }
        prev = row;
    }

    best
}
