// SPDX-License-Identifier: Apache-2.0

use crate::dto::{
    CarChoicesDto, CarDetailDto, CarDto, ChoiceDto, DriverDetailDto, DriverDto, ManufacturerDto,
    PageInfoDto,
};
use crate::errors::ApiError;
use serde_json::{json, Value};
use taxi_fleet_model::{
    CarDetail, CarListing, Driver, DriverDetail, DriverId, Manufacturer, ValidationErrors,
};
use taxi_fleet_store::{Page, StoreError};

#[must_use]
pub fn manufacturer_dto(m: &Manufacturer) -> ManufacturerDto {
    ManufacturerDto {
        id: m.id.get(),
        name: m.name.clone(),
        country: m.country.clone(),
        display: m.to_string(),
    }
}

#[must_use]
pub fn car_dto(listing: &CarListing) -> CarDto {
    CarDto {
        id: listing.car.id.get(),
        model: listing.car.model.clone(),
        manufacturer: manufacturer_dto(&listing.manufacturer),
    }
}

#[must_use]
pub fn driver_dto(d: &Driver) -> DriverDto {
    DriverDto {
        id: d.id.get(),
        username: d.account.username.as_str().to_string(),
        first_name: d.account.first_name.clone(),
        last_name: d.account.last_name.clone(),
        email: d.account.email.clone(),
        license_number: d.license_number.as_str().to_string(),
        is_staff: d.account.is_staff,
        date_joined: d.account.date_joined,
        display: d.to_string(),
    }
}

/// `actor` is the logged-in driver; `user_is_owner` tells whether they drive this car.
#[must_use]
pub fn car_detail_dto(detail: &CarDetail, actor: Option<DriverId>) -> CarDetailDto {
    CarDetailDto {
        car: CarDto {
            id: detail.car.id.get(),
            model: detail.car.model.clone(),
            manufacturer: manufacturer_dto(&detail.manufacturer),
        },
        drivers: detail.drivers.iter().map(driver_dto).collect(),
        user_is_owner: actor.is_some_and(|id| detail.has_driver(id)),
    }
}

#[must_use]
pub fn driver_detail_dto(detail: &DriverDetail) -> DriverDetailDto {
    DriverDetailDto {
        driver: driver_dto(&detail.driver),
        cars: detail.cars.iter().map(car_dto).collect(),
    }
}

#[must_use]
pub fn page_info<T>(page: &Page<T>) -> PageInfoDto {
    PageInfoDto {
        number: page.number,
        num_pages: page.num_pages,
        page_size: page.page_size,
        total_items: page.total_items,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        next_page: page.has_next().then_some(page.number + 1),
        previous_page: page.has_previous().then_some(page.number - 1),
        is_paginated: page.is_paginated(),
    }
}

#[must_use]
pub fn car_choices(manufacturers: &[Manufacturer], drivers: &[Driver]) -> CarChoicesDto {
    CarChoicesDto {
        manufacturers: manufacturers
            .iter()
            .map(|m| ChoiceDto {
                id: m.id.get(),
                label: m.to_string(),
            })
            .collect(),
        drivers: drivers
            .iter()
            .map(|d| ChoiceDto {
                id: d.id.get(),
                label: d.to_string(),
            })
            .collect(),
    }
}

#[must_use]
pub fn field_errors_json(errors: &ValidationErrors) -> Value {
    Value::Array(
        errors
            .errors()
            .iter()
            .map(|e| json!({"field": e.field, "code": e.code(), "message": e.reason.to_string()}))
            .collect(),
    )
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        Self::validation_failed(field_errors_json(&value))
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::ConstraintViolation { field, message } => {
                Self::constraint_violation(&field, &message)
            }
            StoreError::NotFound { entity, id } => Self::not_found(entity, &id.to_string()),
            StoreError::Validation(errors) => errors.into(),
            StoreError::Unavailable(message) => Self::internal(format!("store unavailable: {message}")),
            other => Self::internal(other.to_string()),
        }
    }
}
