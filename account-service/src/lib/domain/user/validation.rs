//! Field-level validation of user payloads.
//!
//! Fields are checked in a fixed order (username, nickname, email, password)
//! and the first violation is returned. Trimming and password hashing are
//! only applied to the draft once every rule has passed.

use std::fmt;
use std::str::FromStr;

use auth::password::is_strong;
use auth::PasswordHasher;
use serde::Serialize;
use thiserror::Error;

use crate::user::models::UserDraft;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 100;
const NICKNAME_MIN: usize = 3;
const NICKNAME_MAX: usize = 100;
const EMAIL_MAX: usize = 100;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 100;

/// Which rule set applies to a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// New account: every field including the password.
    Register,
    /// Existing account: profile fields only, password untouched.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    FieldRequired,
    InvalidFormat,
    TooShort,
    TooLong,
    InvalidCharacters,
    PasswordTooWeak,
    HashError,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::FieldRequired => "FIELD_REQUIRED",
            ValidationCode::InvalidFormat => "INVALID_FORMAT",
            ValidationCode::TooShort => "TOO_SHORT",
            ValidationCode::TooLong => "TOO_LONG",
            ValidationCode::InvalidCharacters => "INVALID_CHARACTERS",
            ValidationCode::PasswordTooWeak => "PASSWORD_TOO_WEAK",
            ValidationCode::HashError => "HASH_ERROR",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule violation, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message} ({code})")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
    pub code: ValidationCode,
}

impl ValidationError {
    fn new(field: &'static str, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            code,
        }
    }
}

impl UserDraft {
    /// Validate the draft for `operation`.
    ///
    /// On success the username, nickname and email are replaced by their
    /// trimmed forms, and for [`Operation::Register`] the plaintext password
    /// is replaced by its hash. On failure the draft is left untouched.
    ///
    /// # Errors
    /// The first [`ValidationError`] in field order.
    pub fn validate(
        &mut self,
        operation: Operation,
        hasher: &PasswordHasher,
    ) -> Result<(), ValidationError> {
        let username = self.username.trim().to_string();
        let nickname = self.nickname.trim().to_string();
        let email = self.email.trim().to_string();

        validate_username(&username)?;
        validate_nickname(&nickname)?;
        validate_email(&email)?;

        let password_hash = match operation {
            Operation::Register => {
                validate_password(&self.password)?;
                let hash = hasher.hash(&self.password).map_err(|e| {
                    tracing::error!(error = %e, "Password hashing failed during validation");
                    ValidationError::new("password", ValidationCode::HashError, "failed to hash password")
                })?;
                Some(hash)
            }
            Operation::Update => None,
        };

        self.username = username;
        self.nickname = nickname;
        self.email = email;
        if let Some(hash) = password_hash {
            self.password = hash;
        }

        Ok(())
    }
}

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let length = value.chars().count();

    if length == 0 {
        Err(ValidationError::new(
            field,
            ValidationCode::FieldRequired,
            format!("{} is required", field),
        ))
    } else if length < min {
        Err(ValidationError::new(
            field,
            ValidationCode::TooShort,
            format!("{} must be at least {} characters", field, min),
        ))
    } else if length > max {
        Err(ValidationError::new(
            field,
            ValidationCode::TooLong,
            format!("{} must be at most {} characters", field, max),
        ))
    } else {
        Ok(())
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    check_length("username", username, USERNAME_MIN, USERNAME_MAX)?;

    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(ValidationError::new(
            "username",
            ValidationCode::InvalidCharacters,
            "username may only contain letters, digits, underscores and hyphens",
        ))
    }
}

fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    check_length("nickname", nickname, NICKNAME_MIN, NICKNAME_MAX)
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    check_length("email", email, 1, EMAIL_MAX)?;

    email_address::EmailAddress::from_str(email)
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("email", ValidationCode::InvalidFormat, "email format is invalid")
        })
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    check_length("password", password, PASSWORD_MIN, PASSWORD_MAX)?;

    if is_strong(password) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "password",
            ValidationCode::PasswordTooWeak,
            "password must contain an uppercase letter, a lowercase letter, a digit and a special character",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> UserDraft {
        UserDraft::new("alice_01", "Alice", "alice@example.com", "Secure_pass1")
    }

    fn assert_violation(draft: &mut UserDraft, field: &str, code: ValidationCode) {
        let err = draft
            .validate(Operation::Register, &PasswordHasher::new())
            .expect_err("validation should fail");
        assert_eq!(err.field, field);
        assert_eq!(err.code, code);
    }

    #[test]
    fn test_register_hashes_password() {
        let hasher = PasswordHasher::new();
        let mut draft = valid_draft();

        draft
            .validate(Operation::Register, &hasher)
            .expect("draft should be valid");

        assert_ne!(draft.password, "Secure_pass1");
        assert!(draft.password.starts_with("$argon2"));
        assert!(hasher.verify(&draft.password, "Secure_pass1").is_ok());
    }

    #[test]
    fn test_success_trims_profile_fields() {
        let mut draft = UserDraft::new(
            "  alice_01 ",
            "\tAlice Liddell ",
            " alice@example.com\n",
            "Secure_pass1",
        );

        draft
            .validate(Operation::Register, &PasswordHasher::new())
            .expect("draft should be valid");

        assert_eq!(draft.username, "alice_01");
        assert_eq!(draft.nickname, "Alice Liddell");
        assert_eq!(draft.email, "alice@example.com");
    }

    #[test]
    fn test_failure_leaves_draft_untouched() {
        let mut draft = UserDraft::new(" alice_01 ", " Alice ", " not-an-email ", "Secure_pass1");
        let before = draft.clone();

        assert_violation(&mut draft, "email", ValidationCode::InvalidFormat);
        assert_eq!(draft, before);
    }

    #[test]
    fn test_username_rules() {
        let mut draft = valid_draft();
        draft.username = "al".to_string();
        assert_violation(&mut draft, "username", ValidationCode::TooShort);

        draft.username = "   ".to_string();
        assert_violation(&mut draft, "username", ValidationCode::FieldRequired);

        draft.username = "a".repeat(101);
        assert_violation(&mut draft, "username", ValidationCode::TooLong);

        draft.username = "alice smith".to_string();
        assert_violation(&mut draft, "username", ValidationCode::InvalidCharacters);

        draft.username = "alicé".to_string();
        assert_violation(&mut draft, "username", ValidationCode::InvalidCharacters);

        draft.username = "a".repeat(100);
        assert!(draft
            .validate(Operation::Register, &PasswordHasher::new())
            .is_ok());
    }

    #[test]
    fn test_nickname_rules() {
        let mut draft = valid_draft();
        draft.nickname = String::new();
        assert_violation(&mut draft, "nickname", ValidationCode::FieldRequired);

        draft.nickname = "Al".to_string();
        assert_violation(&mut draft, "nickname", ValidationCode::TooShort);

        draft.nickname = "n".repeat(101);
        assert_violation(&mut draft, "nickname", ValidationCode::TooLong);
    }

    #[test]
    fn test_email_rules() {
        let mut draft = valid_draft();
        draft.email = String::new();
        assert_violation(&mut draft, "email", ValidationCode::FieldRequired);

        draft.email = format!("{}@example.com", "a".repeat(90));
        assert_violation(&mut draft, "email", ValidationCode::TooLong);

        draft.email = "alice.example.com".to_string();
        assert_violation(&mut draft, "email", ValidationCode::InvalidFormat);
    }

    #[test]
    fn test_password_rules() {
        let mut draft = valid_draft();
        draft.password = String::new();
        assert_violation(&mut draft, "password", ValidationCode::FieldRequired);

        draft.password = "Sh0rt!".to_string();
        assert_violation(&mut draft, "password", ValidationCode::TooShort);

        draft.password = format!("Aa1!{}", "x".repeat(97));
        assert_violation(&mut draft, "password", ValidationCode::TooLong);

        draft.password = "alllowercase1!".to_string();
        assert_violation(&mut draft, "password", ValidationCode::PasswordTooWeak);
    }

    #[test]
    fn test_first_failing_field_wins() {
        let mut draft = UserDraft::new("al", "", "bad", "");
        assert_violation(&mut draft, "username", ValidationCode::TooShort);

        let mut draft = UserDraft::new("alice_01", "", "bad", "");
        assert_violation(&mut draft, "nickname", ValidationCode::FieldRequired);

        let mut draft = UserDraft::new("alice_01", "Alice", "bad", "");
        assert_violation(&mut draft, "email", ValidationCode::InvalidFormat);
    }

    #[test]
    fn test_update_ignores_password() {
        let mut draft = UserDraft::new(" alice_02 ", "Alice", "alice@example.com", "");

        draft
            .validate(Operation::Update, &PasswordHasher::new())
            .expect("update draft should be valid");

        assert_eq!(draft.username, "alice_02");
        assert!(draft.password.is_empty());

        let mut draft = UserDraft::new("alice_02", "Alice", "alice@example.com", "weak");
        draft
            .validate(Operation::Update, &PasswordHasher::new())
            .expect("update draft should be valid");
        assert_eq!(draft.password, "weak");
    }

    #[test]
    fn test_code_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(ValidationCode::PasswordTooWeak).unwrap(),
            serde_json::json!("PASSWORD_TOO_WEAK")
        );
        assert_eq!(ValidationCode::TooShort.to_string(), "TOO_SHORT");
    }
}
