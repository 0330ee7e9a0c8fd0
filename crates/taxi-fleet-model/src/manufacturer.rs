// SPDX-License-Identifier: Apache-2.0

use crate::ids::ManufacturerId;
use crate::validate::{required_text, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const MANUFACTURER_NAME_MAX_LEN: usize = 70;
pub const COUNTRY_MAX_LEN: usize = 70;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: ManufacturerId,
    pub name: String,
    pub country: String,
}

impl Display for Manufacturer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.country)
    }
}

/// Validated input for creating or replacing a manufacturer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewManufacturer {
    name: String,
    country: String,
}

impl NewManufacturer {
    pub fn new(name: &str, country: &str) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.collect(required_text("name", name, MANUFACTURER_NAME_MAX_LEN));
        let country = errors.collect(required_text("country", country, COUNTRY_MAX_LEN));
        match (name, country) {
            (Some(name), Some(country)) => Ok(Self { name, country }),
            _ => Err(errors),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }
}
