// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManufacturerDto {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarDto {
    pub id: i64,
    pub model: String,
    pub manufacturer: ManufacturerDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverDto {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub license_number: String,
    pub is_staff: bool,
    pub date_joined: u64,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarDetailDto {
    pub car: CarDto,
    pub drivers: Vec<DriverDto>,
    pub user_is_owner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverDetailDto {
    pub driver: DriverDto,
    pub cars: Vec<CarDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageInfoDto {
    pub number: usize,
    pub num_pages: usize,
    pub page_size: usize,
    pub total_items: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page: Option<usize>,
    pub previous_page: Option<usize>,
    pub is_paginated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListResponseDto<T> {
    pub items: Vec<T>,
    pub page: PageInfoDto,
}

/// Driver list view; `current_user` is the session actor's id when logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverListResponseDto {
    pub items: Vec<DriverDto>,
    pub page: PageInfoDto,
    pub current_user: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HomeDto {
    pub num_drivers: u64,
    pub num_manufacturers: u64,
    pub num_cars: u64,
    pub num_visits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedirectDto {
    pub redirect: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceDto {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarChoicesDto {
    pub manufacturers: Vec<ChoiceDto>,
    pub drivers: Vec<ChoiceDto>,
}

/// GET side of a create/update form: current values plus the page to go back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormViewDto {
    pub form: Value,
    pub previous: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<CarChoicesDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfirmDeleteDto {
    pub object: Value,
    pub previous: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionUserDto {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
}
