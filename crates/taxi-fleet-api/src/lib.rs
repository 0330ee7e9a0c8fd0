// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Wire contract of the fleet service: error codes, form bodies, query
//! parameters and the JSON views handlers render.

pub mod convert;
pub mod dto;
pub mod error_mapping;
pub mod errors;
pub mod params;

pub use dto::{
    CarChoicesDto, CarDetailDto, CarDto, ChoiceDto, ConfirmDeleteDto, DriverDetailDto, DriverDto,
    DriverListResponseDto, FormViewDto, HomeDto, ListResponseDto, ManufacturerDto, PageInfoDto,
    RedirectDto, SessionUserDto,
};
pub use errors::{ApiError, ApiErrorCode};
pub use params::{CarForm, LicenseUpdateForm, LoginForm, ManufacturerForm};

pub const CRATE_NAME: &str = "taxi-fleet-api";

/// Where the login form lives; unauthorized responses point here.
pub const LOGIN_PATH: &str = "/accounts/login/";
