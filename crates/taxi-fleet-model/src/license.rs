// SPDX-License-Identifier: Apache-2.0

use crate::validate::{ValidationError, ValidationReason};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const LICENSE_NUMBER_FIELD: &str = "license_number";
pub const LICENSE_NUMBER_LEN: usize = 8;
pub const LICENSE_LETTER_PREFIX_LEN: usize = 3;

/// Validates a driver license number of the form `[A-Z]{3}[0-9]{5}`.
///
/// Checks run in a fixed order and the first failure wins:
/// length, then the uppercase letter prefix, then the digit suffix.
/// The input is taken verbatim; surrounding whitespace counts toward the length.
pub fn validate_license_number(input: &str) -> Result<LicenseNumber, ValidationError> {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() != LICENSE_NUMBER_LEN {
        return Err(ValidationError::new(
            LICENSE_NUMBER_FIELD,
            ValidationReason::WrongLength {
                expected: LICENSE_NUMBER_LEN,
                actual: chars.len(),
            },
        ));
    }
    let (prefix, suffix) = chars.split_at(LICENSE_LETTER_PREFIX_LEN);
    if !prefix.iter().all(char::is_ascii_uppercase) {
        return Err(ValidationError::new(
            LICENSE_NUMBER_FIELD,
            ValidationReason::NotUppercaseLetters,
        ));
    }
    if !suffix.iter().all(char::is_ascii_digit) {
        return Err(ValidationError::new(
            LICENSE_NUMBER_FIELD,
            ValidationReason::NotDigits,
        ));
    }
    Ok(LicenseNumber(input.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicenseNumber(String);

impl LicenseNumber {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        validate_license_number(input)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for LicenseNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_license_number(&value)
    }
}

impl From<LicenseNumber> for String {
    fn from(value: LicenseNumber) -> Self {
        value.0
    }
}

impl Display for LicenseNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
