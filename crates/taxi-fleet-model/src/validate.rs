// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationReason {
    Required,
    TooLong { max: usize, actual: usize },
    WrongLength { expected: usize, actual: usize },
    NotUppercaseLetters,
    NotDigits,
    InvalidCharacters,
    InvalidEmail,
    PasswordMismatch,
    PasswordTooShort { min: usize },
    PasswordEntirelyNumeric,
}

impl ValidationReason {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::TooLong { .. } => "max_length",
            Self::WrongLength { .. } => "wrong_length",
            Self::NotUppercaseLetters => "not_uppercase_letters",
            Self::NotDigits => "not_digits",
            Self::InvalidCharacters => "invalid_characters",
            Self::InvalidEmail => "invalid_email",
            Self::PasswordMismatch => "password_mismatch",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::PasswordEntirelyNumeric => "password_entirely_numeric",
        }
    }
}

impl Display for ValidationReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => write!(f, "this field is required"),
            Self::TooLong { max, actual } => write!(
                f,
                "ensure this value has at most {max} characters (it has {actual})"
            ),
            Self::WrongLength { expected, actual } => {
                write!(f, "must be exactly {expected} characters, not {actual}")
            }
            Self::NotUppercaseLetters => {
                write!(f, "first three characters must be uppercase letters")
            }
            Self::NotDigits => write!(f, "remaining characters must be digits"),
            Self::InvalidCharacters => write!(
                f,
                "may contain only letters, digits and @/./+/-/_ characters"
            ),
            Self::InvalidEmail => write!(f, "enter a valid email address"),
            Self::PasswordMismatch => write!(f, "the two password fields didn't match"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must contain at least {min} characters")
            }
            Self::PasswordEntirelyNumeric => write!(f, "password can't be entirely numeric"),
        }
    }
}

/// One failed rule on one named input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: ValidationReason,
}

impl ValidationError {
    #[must_use]
    pub const fn new(field: &'static str, reason: ValidationReason) -> Self {
        Self { field, reason }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.reason.code()
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Every field failure of one submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Runs `check` and keeps its value, or records its error.
    pub fn collect<T>(&mut self, check: Result<T, ValidationError>) -> Option<T> {
        match check {
            Ok(value) => Some(value),
            Err(error) => {
                self.0.push(error);
                None
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    #[must_use]
    pub fn for_field(&self, field: &str) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| e.field == field).collect()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(value: ValidationError) -> Self {
        Self(vec![value])
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{rendered}")
    }
}

impl std::error::Error for ValidationErrors {}

/// Trims `input` and enforces `1..=max` characters.
pub fn required_text(
    field: &'static str,
    input: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, ValidationReason::Required));
    }
    optional_text(field, trimmed, max)
}

/// Trims `input` and enforces at most `max` characters; empty is allowed.
pub fn optional_text(
    field: &'static str,
    input: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let actual = trimmed.chars().count();
    if actual > max {
        return Err(ValidationError::new(
            field,
            ValidationReason::TooLong { max, actual },
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_bounds_by_characters() {
        assert_eq!(required_text("name", "  Audi ", 70).expect("trim"), "Audi");
        assert_eq!(
            required_text("name", "   ", 70).expect_err("blank").reason,
            ValidationReason::Required
        );
        let err = required_text("name", &"é".repeat(71), 70).expect_err("too long");
        assert_eq!(err.reason, ValidationReason::TooLong { max: 70, actual: 71 });
        assert!(required_text("name", &"é".repeat(70), 70).is_ok());
    }

    #[test]
    fn collected_errors_keep_field_order() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.collect(required_text("name", "x", 70)).as_deref(), Some("x"));
        assert!(errors.collect(required_text("country", "", 70)).is_none());
        assert!(errors.collect(required_text("model", "", 70)).is_none());
        let rendered = errors.to_string();
        assert_eq!(
            rendered,
            "country: this field is required; model: this field is required"
        );
        assert_eq!(errors.for_field("model").len(), 1);
        assert!(errors.into_result().is_err());
    }
}
