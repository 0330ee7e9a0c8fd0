// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Fleet model SSOT: manufacturers, cars, drivers and the rules their fields obey.
//!
//! ```compile_fail
//! use taxi_fleet_model::ValidationReason;
//!
//! fn exhaustive_match(r: ValidationReason) -> &'static str {
//!     match r {
//!         ValidationReason::Required => "required",
//!         ValidationReason::NotDigits => "digits",
//!     }
//! }
//! ```

mod car;
mod driver;
mod ids;
mod license;
mod manufacturer;
mod validate;

pub use car::{Car, CarDetail, CarListing, Membership, NewCar, CAR_MODEL_MAX_LEN};
pub use driver::{
    Account, Driver, DriverDetail, DriverRegistration, NewDriver, Username, EMAIL_MAX_LEN,
    PASSWORD_MIN_LEN, PERSON_NAME_MAX_LEN, USERNAME_MAX_LEN,
};
pub use ids::{CarId, DriverId, ManufacturerId};
pub use license::{
    validate_license_number, LicenseNumber, LICENSE_LETTER_PREFIX_LEN, LICENSE_NUMBER_FIELD,
    LICENSE_NUMBER_LEN,
};
pub use manufacturer::{Manufacturer, NewManufacturer, COUNTRY_MAX_LEN, MANUFACTURER_NAME_MAX_LEN};
pub use validate::{
    optional_text, required_text, ValidationError, ValidationErrors, ValidationReason,
};

pub const CRATE_NAME: &str = "taxi-fleet-model";
