//! Payload validation for user creation
//!
//! Validation runs before any store call. It is pure and never
//! mutates the payload.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Valid email is required";

/// Outcome of validating a candidate payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    /// Ordered, human-readable messages
    pub errors: Vec<String>,
}

impl Validation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

/// Returns true if `email` has a basic `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Validates a create-user payload.
///
/// `name` must be a string that is non-empty after trimming. `email`
/// must be a string whose trimmed value passes [`is_valid_email`].
pub fn validate_user(payload: &Value) -> Validation {
    let mut errors = Vec::new();

    let name = payload.get("name").and_then(Value::as_str);
    if name.map_or(true, |n| n.trim().is_empty()) {
        errors.push(NAME_REQUIRED.to_string());
    }

    let email = payload.get("email").and_then(Value::as_str);
    if !email.is_some_and(|e| is_valid_email(e.trim())) {
        errors.push(EMAIL_REQUIRED.to_string());
    }

    Validation::from_errors(errors)
}
