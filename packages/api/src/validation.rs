//! # Client-side form validation
//!
//! Every auth form is checked here before a request is built, so an invalid
//! form never reaches the backend. Checks run in a fixed order (email, password,
//! confirmation) and the first failure is reported.
//!
//! | Form | Email has `@` | Password present | Password ≥ 6 | Confirmation matches |
//! |------|:---:|:---:|:---:|:---:|
//! | [`SignInForm`] | ✓ | ✓ | | |
//! | [`SignUpForm`] | ✓ | | ✓ | ✓ |
//! | [`RecoveryForm`] | ✓ | | | |
//! | [`ResetPasswordForm`] | | | ✓ | ✓ |
//!
//! Each [`ValidationError`] carries the translation key the UI shows.

use serde::{Deserialize, Serialize};

/// Minimum length for new passwords.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter your password")]
    MissingPassword,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordsDoNotMatch,
    #[error("Task title cannot be empty")]
    EmptyTitle,
}

impl ValidationError {
    pub fn translation_key(self) -> &'static str {
        match self {
            Self::InvalidEmail => "auth.errors.invalidEmail",
            Self::MissingPassword => "auth.errors.invalidPassword",
            Self::PasswordTooShort => "auth.errors.passwordTooShort",
            Self::PasswordsDoNotMatch => "auth.errors.passwordsDoNotMatch",
            Self::EmptyTitle => "tasks.errors.emptyTitle",
        }
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_new_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_confirmation(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordsDoNotMatch);
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::MissingPassword);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        validate_new_password(&self.password)?;
        validate_confirmation(&self.password, &self.confirm_password)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryForm {
    pub email: String,
}

impl RecoveryForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_new_password(&self.password)?;
        validate_confirmation(&self.password, &self.confirm_password)
    }
}
