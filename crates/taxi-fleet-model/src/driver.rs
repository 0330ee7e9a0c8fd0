// SPDX-License-Identifier: Apache-2.0

use crate::car::CarListing;
use crate::ids::DriverId;
use crate::license::{validate_license_number, LicenseNumber};
use crate::validate::{
    optional_text, required_text, ValidationError, ValidationErrors, ValidationReason,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const USERNAME_MAX_LEN: usize = 150;
pub const PERSON_NAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = required_text("username", input, USERNAME_MAX_LEN)?;
        if !s
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            return Err(ValidationError::new(
                "username",
                ValidationReason::InvalidCharacters,
            ));
        }
        Ok(Self(s))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Credentials and personal data of an authenticatable user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: Username,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub is_staff: bool,
    /// Seconds since the Unix epoch.
    pub date_joined: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub account: Account,
    pub license_number: LicenseNumber,
}

impl Display for Driver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} {}",
            self.account.username, self.account.first_name, self.account.last_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverDetail {
    pub driver: Driver,
    pub cars: Vec<CarListing>,
}

/// Raw registration form input.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DriverRegistration {
    pub username: String,
    pub password1: String,
    pub password2: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub license_number: String,
}

impl std::fmt::Debug for DriverRegistration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistration")
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("license_number", &self.license_number)
            .finish_non_exhaustive()
    }
}

impl DriverRegistration {
    /// Runs every field rule and reports all failures together.
    pub fn validate(&self) -> Result<NewDriver, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let username = errors.collect(Username::parse(&self.username));
        let first_name =
            errors.collect(optional_text("first_name", &self.first_name, PERSON_NAME_MAX_LEN));
        let last_name =
            errors.collect(optional_text("last_name", &self.last_name, PERSON_NAME_MAX_LEN));
        let email = errors.collect(parse_email(&self.email));
        let license_number = errors.collect(validate_license_number(&self.license_number));
        let password = errors.collect(check_password(&self.password1, &self.password2));

        match (username, first_name, last_name, email, license_number, password) {
            (
                Some(username),
                Some(first_name),
                Some(last_name),
                Some(email),
                Some(license_number),
                Some(password),
            ) => Ok(NewDriver {
                username,
                password,
                first_name,
                last_name,
                email,
                license_number,
                is_staff: false,
            }),
            _ => Err(errors),
        }
    }
}

fn check_password(password1: &str, password2: &str) -> Result<String, ValidationError> {
    if password1.is_empty() {
        return Err(ValidationError::new("password1", ValidationReason::Required));
    }
    if password1 != password2 {
        return Err(ValidationError::new(
            "password2",
            ValidationReason::PasswordMismatch,
        ));
    }
    if password1.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::new(
            "password2",
            ValidationReason::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            },
        ));
    }
    if password1.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "password2",
            ValidationReason::PasswordEntirelyNumeric,
        ));
    }
    Ok(password1.to_string())
}

fn parse_email(input: &str) -> Result<String, ValidationError> {
    let email = optional_text("email", input, EMAIL_MAX_LEN)?;
    if email.is_empty() {
        return Ok(email);
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace) =>
        {
            Ok(email)
        }
        _ => Err(ValidationError::new("email", ValidationReason::InvalidEmail)),
    }
}

/// Validated driver account ready to be persisted; the password is still plain text.
#[derive(Clone, PartialEq, Eq)]
pub struct NewDriver {
    username: Username,
    password: String,
    first_name: String,
    last_name: String,
    email: String,
    license_number: LicenseNumber,
    is_staff: bool,
}

impl std::fmt::Debug for NewDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewDriver")
            .field("username", &self.username)
            .field("license_number", &self.license_number)
            .field("is_staff", &self.is_staff)
            .finish_non_exhaustive()
    }
}

impl NewDriver {
    #[must_use]
    pub fn with_staff(mut self, is_staff: bool) -> Self {
        self.is_staff = is_staff;
        self
    }

    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn license_number(&self) -> &LicenseNumber {
        &self.license_number
    }

    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.is_staff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_accept_the_documented_symbol_set() {
        assert!(Username::parse("joe.doe+1@fleet_x-y").is_ok());
        assert_eq!(
            Username::parse("joe doe").expect_err("space").reason,
            ValidationReason::InvalidCharacters
        );
        assert_eq!(
            Username::parse(&"a".repeat(151)).expect_err("long").reason,
            ValidationReason::TooLong {
                max: 150,
                actual: 151
            }
        );
    }

    #[test]
    fn email_is_optional_but_checked_when_present() {
        assert_eq!(parse_email("  ").expect("empty"), "");
        assert!(parse_email("joe@fleet.example").is_ok());
        assert!(parse_email("joe@fleet").is_err());
        assert!(parse_email("@fleet.example").is_err());
    }

    #[test]
    fn debug_output_never_contains_passwords() {
        let registration = DriverRegistration {
            username: "joe".to_string(),
            password1: "hunter2hunter2".to_string(),
            password2: "hunter2hunter2".to_string(),
            license_number: "ABC12345".to_string(),
            ..DriverRegistration::default()
        };
        assert!(!format!("{registration:?}").contains("hunter2"));
        let new_driver = registration.validate().expect("valid");
        assert!(!format!("{new_driver:?}").contains("hunter2"));
    }
}
