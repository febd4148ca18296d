//! Client-side validation
//!
//! Checks run by units before any backend call: bloom length, required
//! credential fields, and the signup password rules the server enforces.
//! Failures are reported inline by the originating unit and never reach the
//! event bus.

use crate::error::ValidationError;

/// Minimum password length accepted by the server at registration
pub const MIN_PASSWORD_LENGTH: usize = 5;

/// Validator for bloom content
///
/// # Example
///
/// ```
/// use libbloom::service::validation::ContentValidator;
///
/// let validator = ContentValidator::new(280);
/// assert!(validator.validate("Hello forest").is_ok());
/// assert!(validator.validate(&"x".repeat(281)).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContentValidator {
    max_chars: usize,
}

impl ContentValidator {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Validate bloom content, returning the trimmed text to post
    ///
    /// Length is measured in characters, not bytes.
    pub fn validate<'a>(&self, content: &'a str) -> Result<&'a str, ValidationError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        let actual = trimmed.chars().count();
        if actual > self.max_chars {
            return Err(ValidationError::ContentTooLong {
                limit: self.max_chars,
                actual,
            });
        }

        Ok(trimmed)
    }

    /// `count/max` label shown under the composer
    pub fn counter(&self, content: &str) -> String {
        format!("{}/{}", content.chars().count(), self.max_chars)
    }

    /// Whether the draft is at or over the limit
    pub fn is_at_limit(&self, content: &str) -> bool {
        content.chars().count() >= self.max_chars
    }
}

/// Validate login credentials
pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::MissingField("Username"));
    }
    if password.is_empty() {
        return Err(ValidationError::MissingField("Password"));
    }
    Ok(())
}

/// Validate a signup form
pub fn validate_signup(
    username: &str,
    password: &str,
    confirmation: Option<&str>,
) -> Result<(), ValidationError> {
    validate_credentials(username, password)?;

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }

    if let Some(confirmation) = confirmation {
        if confirmation != password {
            return Err(ValidationError::PasswordMismatch);
        }
    }

    Ok(())
}
