use serde_json::json;
use taxi_fleet_api::convert::{car_detail_dto, field_errors_json, page_info};
use taxi_fleet_api::error_mapping::{map_error, API_ERROR_SCHEMA_REF};
use taxi_fleet_api::{ApiError, ApiErrorCode};
use taxi_fleet_model::{
    Account, Car, CarDetail, CarId, Driver, DriverId, LicenseNumber, Manufacturer,
    ManufacturerId, NewManufacturer, Username,
};
use taxi_fleet_store::{Page, StoreError};

#[test]
fn every_error_code_has_a_stable_status() {
    let cases = [
        (ApiErrorCode::ValidationFailed, 400),
        (ApiErrorCode::InvalidQueryParameter, 400),
        (ApiErrorCode::Unauthorized, 401),
        (ApiErrorCode::Forbidden, 403),
        (ApiErrorCode::NotFound, 404),
        (ApiErrorCode::ConstraintViolation, 409),
        (ApiErrorCode::PayloadTooLarge, 413),
        (ApiErrorCode::Timeout, 503),
        (ApiErrorCode::Internal, 500),
    ];
    for (code, status) in cases {
        let mapped = map_error(&ApiError::new(code, "x", json!({}), "req-1"));
        assert_eq!(mapped.status_code, status, "{}", code.as_str());
        assert_eq!(mapped.schema_ref, API_ERROR_SCHEMA_REF);
    }
}

#[test]
fn store_errors_convert_to_wire_codes() {
    let constraint: ApiError = StoreError::constraint("name", "manufacturer with this name already exists").into();
    assert_eq!(constraint.code, ApiErrorCode::ConstraintViolation);
    assert_eq!(constraint.details["field_errors"][0]["field"], "name");

    let missing: ApiError = StoreError::not_found("car", 9).into();
    assert_eq!(missing.code, ApiErrorCode::NotFound);
    assert_eq!(missing.details["id"], "9");

    let sqlite: ApiError = StoreError::Sqlite("disk I/O error".to_string()).into();
    assert_eq!(sqlite.code, ApiErrorCode::Internal);
}

#[test]
fn validation_errors_become_field_errors() {
    let errors = NewManufacturer::new("", "").expect_err("invalid");
    let json = field_errors_json(&errors);
    assert_eq!(json.as_array().map(Vec::len), Some(2));
    assert_eq!(json[0]["field"], "name");
    assert_eq!(json[0]["code"], "required");
    let api: ApiError = errors.into();
    assert_eq!(api.code, ApiErrorCode::ValidationFailed);
}

#[test]
fn api_error_body_round_trips_with_request_id() {
    let err = ApiError::unauthorized().with_request_id("req-42");
    let text = serde_json::to_string(&err).expect("encode");
    let back: ApiError = serde_json::from_str(&text).expect("decode");
    assert_eq!(back, err);
    assert_eq!(back.to_string(), "Unauthorized: authentication required");
}

#[test]
fn car_detail_marks_owner_only_for_members() {
    let manufacturer = Manufacturer {
        id: ManufacturerId::new(1),
        name: "Tesla".to_string(),
        country: "USA".to_string(),
    };
    let driver = Driver {
        id: DriverId::new(5),
        account: Account {
            username: Username::parse("ann").expect("username"),
            password_hash: "sha256$s$d".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: String::new(),
            is_active: true,
            is_staff: false,
            date_joined: 1,
        },
        license_number: LicenseNumber::parse("ABC12345").expect("license"),
    };
    let detail = CarDetail {
        car: Car {
            id: CarId::new(2),
            model: "Model 3".to_string(),
            manufacturer_id: manufacturer.id,
        },
        manufacturer,
        drivers: vec![driver],
    };
    assert!(car_detail_dto(&detail, Some(DriverId::new(5))).user_is_owner);
    assert!(!car_detail_dto(&detail, Some(DriverId::new(6))).user_is_owner);
    let anonymous = car_detail_dto(&detail, None);
    assert!(!anonymous.user_is_owner);
    assert_eq!(anonymous.car.manufacturer.display, "Tesla(USA)");
    assert_eq!(anonymous.drivers[0].display, "ann: Ann Lee");
}

#[test]
fn page_info_exposes_neighbours() {
    let page = Page {
        items: vec![(); 1],
        number: 2,
        num_pages: 2,
        page_size: 5,
        total_items: 6,
    };
    let info = page_info(&page);
    assert_eq!(info.previous_page, Some(1));
    assert_eq!(info.next_page, None);
    assert!(info.is_paginated);
}
