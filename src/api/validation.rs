use regex::Regex;
use std::sync::OnceLock;

use super::ApiError;
use crate::domain::PostPrefix;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_COMMENT_CHARS: usize = 1000;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

pub fn validate_login_id(login_id: &str) -> Result<&str, ApiError> {
    let trimmed = login_id.trim();
    if trimmed.chars().count() < 3 {
        return Err(ApiError::validation(
            "User id must be at least 3 characters",
        ));
    }
    Ok(trimmed)
}

pub fn validate_display_name<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.chars().count() < 2 {
        return Err(ApiError::validation(format!(
            "{field} must be at least 2 characters"
        )));
    }
    Ok(trimmed)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if !email_regex().is_match(trimmed) {
        return Err(ApiError::validation(format!(
            "Invalid email address: {trimmed}"
        )));
    }
    Ok(trimmed)
}

/// At least 8 characters with a lowercase letter, an uppercase letter, a digit
/// and a symbol.
pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    let long_enough = password.chars().count() >= 8;
    let has_lower = password.chars().any(char::is_lowercase);
    let has_upper = password.chars().any(char::is_uppercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if !(long_enough && has_lower && has_upper && has_digit && has_symbol) {
        return Err(ApiError::validation(
            "Password must be at least 8 characters and contain upper and lower case letters, a digit and a symbol",
        ));
    }
    Ok(password)
}

pub fn validate_title(title: &str) -> Result<&str, ApiError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Title cannot be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::validation(format!(
            "Title must be {MAX_TITLE_CHARS} characters or less"
        )));
    }
    Ok(trimmed)
}

pub fn validate_post_content(content: &str) -> Result<&str, ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::validation("Content cannot be empty"));
    }
    Ok(content)
}

pub fn validate_prefix(prefix: &str) -> Result<PostPrefix, ApiError> {
    prefix.parse().map_err(ApiError::validation)
}

pub fn validate_comment(content: &str) -> Result<&str, ApiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Comment cannot be empty"));
    }
    if trimmed.chars().count() > MAX_COMMENT_CHARS {
        return Err(ApiError::validation(format!(
            "Comment must be {MAX_COMMENT_CHARS} characters or less"
        )));
    }
    Ok(trimmed)
}

pub fn validate_score(score: i32) -> Result<i32, ApiError> {
    if !(1..=5).contains(&score) {
        return Err(ApiError::validation(format!(
            "Invalid rating: {score}. Rating must be between 1 and 5"
        )));
    }
    Ok(score)
}

pub fn validate_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}
