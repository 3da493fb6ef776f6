//! Form validation run before any request is built.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use crate::net::types::{JournalEntry, ProfileUpdate, User};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("invalid entry id `{0}`")]
    InvalidEntryId(String),
}

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Login needs both fields.
///
/// # Errors
///
/// Returns the first missing field.
pub fn login(user_name: &str, password: &str) -> Result<(), ValidationError> {
    required(user_name, "username")?;
    // Passwords are not trimmed; a whitespace password is still a password.
    if password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    Ok(())
}

/// Registration and admin provisioning both need a user name and password.
///
/// # Errors
///
/// Returns the first missing field.
pub fn new_account(user: &User) -> Result<(), ValidationError> {
    login(&user.user_name, user.password.as_deref().unwrap_or_default())
}

/// # Errors
///
/// Returns an error if the user name is blank or a new password is too short
/// or does not match its confirmation.
pub fn profile_update(update: &ProfileUpdate) -> Result<(), ValidationError> {
    required(&update.user_name, "username")?;
    let Some(password) = update.password.as_deref().filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    if update.confirm_password.as_deref() != Some(password) {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the title or content is blank.
pub fn journal_entry(entry: &JournalEntry) -> Result<(), ValidationError> {
    required(&entry.title, "title")?;
    required(&entry.content, "content")
}

/// An entry id becomes one path segment. Dot segments would be resolved away
/// by the URL parser, so they are refused.
///
/// # Errors
///
/// Returns an error for a blank id, `.` or `..`.
pub fn entry_id(id: &str) -> Result<(), ValidationError> {
    required(id, "id")?;
    if matches!(id, "." | "..") {
        return Err(ValidationError::InvalidEntryId(id.to_owned()));
    }
    Ok(())
}
