// SPDX-License-Identifier: Apache-2.0

use crate::driver::Driver;
use crate::ids::{CarId, DriverId, ManufacturerId};
use crate::manufacturer::Manufacturer;
use crate::validate::{required_text, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

pub const CAR_MODEL_MAX_LEN: usize = 70;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub model: String,
    pub manufacturer_id: ManufacturerId,
}

impl Display for Car {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.model)
    }
}

/// A car row joined with its manufacturer, as list pages show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarListing {
    pub car: Car,
    pub manufacturer: Manufacturer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarDetail {
    pub car: Car,
    pub manufacturer: Manufacturer,
    pub drivers: Vec<Driver>,
}

impl CarDetail {
    #[must_use]
    pub fn has_driver(&self, driver: DriverId) -> bool {
        self.drivers.iter().any(|d| d.id == driver)
    }
}

/// Validated input for creating or replacing a car, including its driver set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCar {
    model: String,
    manufacturer_id: ManufacturerId,
    driver_ids: BTreeSet<DriverId>,
}

impl NewCar {
    pub fn new(
        model: &str,
        manufacturer_id: ManufacturerId,
        driver_ids: impl IntoIterator<Item = DriverId>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let model = errors.collect(required_text("model", model, CAR_MODEL_MAX_LEN));
        match model {
            Some(model) => Ok(Self {
                model,
                manufacturer_id,
                driver_ids: driver_ids.into_iter().collect(),
            }),
            None => Err(errors),
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn manufacturer_id(&self) -> ManufacturerId {
        self.manufacturer_id
    }

    #[must_use]
    pub fn driver_ids(&self) -> &BTreeSet<DriverId> {
        &self.driver_ids
    }
}

/// Outcome of toggling one driver's membership on one car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    Added,
    Removed,
}
