// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};
use taxi_fleet_model::{ValidationError, ValidationErrors};

/// Field name used when a constraint cannot be tied to one input field.
pub const NON_FIELD_ERRORS: &str = "__all__";

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// Uniqueness, required-reference or check constraint rejected the write.
    ConstraintViolation { field: String, message: String },
    NotFound { entity: &'static str, id: i64 },
    Validation(ValidationErrors),
    Sqlite(String),
    Unavailable(String),
}

impl StoreError {
    #[must_use]
    pub fn constraint(field: &str, message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConstraintViolation { field, message } => {
                write!(f, "constraint violation on {field}: {message}")
            }
            Self::NotFound { entity, id } => write!(f, "{entity} {id} not found"),
            Self::Validation(errors) => write!(f, "validation failed: {errors}"),
            Self::Sqlite(message) => write!(f, "sqlite error: {message}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ValidationErrors> for StoreError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(err, message)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                constraint_from_message(message.as_deref().unwrap_or_default())
            }
            _ => Self::Sqlite(value.to_string()),
        }
    }
}

/// Maps SQLite's `UNIQUE constraint failed: table.column` text onto a field error.
fn constraint_from_message(message: &str) -> StoreError {
    if let Some(columns) = message.strip_prefix("UNIQUE constraint failed: ") {
        let first = columns.split(',').next().unwrap_or_default().trim();
        if let Some((table, column)) = first.split_once('.') {
            return StoreError::constraint(
                column,
                format!(
                    "{table} with this {} already exists",
                    column.replace('_', " ")
                ),
            );
        }
    }
    StoreError::constraint(NON_FIELD_ERRORS, message.to_string())
}
