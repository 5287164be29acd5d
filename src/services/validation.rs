//! Field checks shared by the HTTP boundary and the CLI.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("Invalid regex")
});

/// Trim `value` and reject it when nothing is left.
pub fn require(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_email(email: &str) -> Result<String, String> {
    let email = require("Email", email)?;
    if !EMAIL_RE.is_match(&email) {
        return Err(format!("'{email}' is not a valid email address"));
    }
    Ok(email)
}

pub fn validate_password(password: &str, min_length: usize) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters"
        ));
    }
    Ok(())
}
