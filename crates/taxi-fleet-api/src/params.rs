// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use taxi_fleet_model::{
    validate_license_number, DriverId, LicenseNumber, ManufacturerId, NewCar, NewManufacturer,
    ValidationError, ValidationErrors, ValidationReason,
};
use taxi_fleet_store::{CarSearch, PageRequest};

pub const PAGE_PARAM: &str = "page";
pub const SEARCH_PARAM: &str = "q";
pub const MANUFACTURER_FILTER_PARAM: &str = "manufacturer";

/// `?page=N` (1-based) or `?page=last`; anything else is a missing page.
pub fn parse_page_param(query: &BTreeMap<String, String>) -> Result<PageRequest, ApiError> {
    match query.get(PAGE_PARAM).map(|raw| raw.trim()) {
        None | Some("") => Ok(PageRequest::number(1)),
        Some("last") => Ok(PageRequest::last()),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(PageRequest::number(n)),
            _ => Err(ApiError::not_found("page", raw)),
        },
    }
}

pub fn parse_car_search(query: &BTreeMap<String, String>) -> Result<CarSearch, ApiError> {
    let manufacturer = match query.get(MANUFACTURER_FILTER_PARAM) {
        None => None,
        Some(raw) if raw.trim().is_empty() => None,
        Some(raw) => Some(
            ManufacturerId::parse(raw)
                .map_err(|_| ApiError::invalid_param(MANUFACTURER_FILTER_PARAM, raw))?,
        ),
    };
    Ok(CarSearch {
        query: query.get(SEARCH_PARAM).cloned(),
        manufacturer,
    })
}

/// Decodes a JSON form body; malformed JSON is reported as a body-level validation failure.
pub fn parse_form<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        ApiError::validation_failed(json!([
            {"field": "__all__", "code": "invalid_body", "message": err.to_string()}
        ]))
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManufacturerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
}

impl ManufacturerForm {
    pub fn validate(&self) -> Result<NewManufacturer, ValidationErrors> {
        NewManufacturer::new(&self.name, &self.country)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarForm {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub manufacturer: Option<i64>,
    #[serde(default)]
    pub drivers: Vec<i64>,
}

impl CarForm {
    pub fn validate(&self) -> Result<NewCar, ValidationErrors> {
        let manufacturer = self.manufacturer.filter(|id| *id > 0).map(ManufacturerId::new);
        let missing_manufacturer =
            || ValidationError::new("manufacturer", ValidationReason::Required);
        let car = NewCar::new(
            &self.model,
            manufacturer.unwrap_or(ManufacturerId::new(0)),
            self.drivers.iter().copied().map(DriverId::new),
        );
        match (car, manufacturer) {
            (Ok(car), Some(_)) => Ok(car),
            (Ok(_), None) => Err(missing_manufacturer().into()),
            (Err(mut errors), None) => {
                errors.push(missing_manufacturer());
                Err(errors)
            }
            (Err(errors), Some(_)) => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicenseUpdateForm {
    #[serde(default)]
    pub license_number: String,
}

impl LicenseUpdateForm {
    pub fn validate(&self) -> Result<LicenseNumber, ValidationErrors> {
        validate_license_number(&self.license_number).map_err(ValidationErrors::from)
    }
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxi_fleet_store::PageSelector;

    fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn page_param_accepts_numbers_and_last() {
        assert_eq!(parse_page_param(&query(&[])).expect("default"), PageRequest::number(1));
        assert_eq!(
            parse_page_param(&query(&[("page", "last")]))
                .expect("last")
                .selector,
            PageSelector::Last
        );
        assert_eq!(
            parse_page_param(&query(&[("page", "3")])).expect("3"),
            PageRequest::number(3)
        );
        assert!(parse_page_param(&query(&[("page", "abc")])).is_err());
        assert!(parse_page_param(&query(&[("page", "0")])).is_err());
    }

    #[test]
    fn car_form_reports_model_and_manufacturer_together() {
        let errors = CarForm::default().validate().expect_err("empty form");
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["model", "manufacturer"]);
    }

    #[test]
    fn license_form_uses_the_shared_validator() {
        let form = LicenseUpdateForm {
            license_number: "ABC1234X".to_string(),
        };
        let errors = form.validate().expect_err("bad digits");
        assert_eq!(errors.errors()[0].code(), "not_digits");
    }

    #[test]
    fn unknown_form_fields_are_rejected() {
        let err = parse_form::<ManufacturerForm>(br#"{"name":"Kia","country":"Korea","x":1}"#)
            .expect_err("unknown field");
        assert_eq!(err.code, crate::ApiErrorCode::ValidationFailed);
    }
}
