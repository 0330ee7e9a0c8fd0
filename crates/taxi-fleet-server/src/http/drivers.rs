// SPDX-License-Identifier: Apache-2.0

use crate::http::handlers_utilities::{
    json_view, previous_page, run_store, run_store_write, see_other, HandlerResult,
};
use crate::session::SessionContext;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use serde_json::json;
use std::collections::BTreeMap;
use taxi_fleet_api::convert::{driver_detail_dto, driver_dto, page_info};
use taxi_fleet_api::params::{parse_form, parse_page_param};
use taxi_fleet_api::{
    ApiError, ConfirmDeleteDto, DriverListResponseDto, FormViewDto, LicenseUpdateForm,
};
use taxi_fleet_model::{DriverId, DriverRegistration};

const LIST_PATH: &str = "/drivers/";

fn driver_id(raw: &str) -> Result<DriverId, ApiError> {
    DriverId::parse(raw).map_err(|_| ApiError::not_found("driver", raw))
}

pub(crate) async fn driver_list_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Query(query): Query<BTreeMap<String, String>>,
) -> HandlerResult {
    let request = parse_page_param(&query)?;
    let page = run_store(&state, "list_drivers", move |s| s.list_drivers(request)).await?;
    Ok(json_view(&DriverListResponseDto {
        items: page.items.iter().map(driver_dto).collect(),
        page: page_info(&page),
        current_user: ctx.actor().map(DriverId::get),
    }))
}

pub(crate) async fn driver_detail_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = driver_id(&raw)?;
    let detail = run_store(&state, "get_driver_detail", move |s| s.get_driver_detail(id)).await?;
    Ok(json_view(&driver_detail_dto(&detail)))
}

pub(crate) async fn driver_create_form_handler(
    ctx: SessionContext,
    headers: HeaderMap,
) -> HandlerResult {
    ctx.require_actor()?;
    Ok(json_view(&FormViewDto {
        form: json!({
            "username": "",
            "password1": "",
            "password2": "",
            "first_name": "",
            "last_name": "",
            "email": "",
            "license_number": ""
        }),
        previous: previous_page(&headers),
        choices: None,
    }))
}

/// Registers a driver account and shows the new driver.
pub(crate) async fn driver_create_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    body: Bytes,
) -> HandlerResult {
    ctx.require_actor()?;
    let input = parse_form::<DriverRegistration>(&body)?.validate()?;
    let driver = run_store_write(&state, "register_driver", move |s| s.register_driver(&input)).await?;
    Ok(see_other(&format!("/drivers/{}/", driver.id)))
}

pub(crate) async fn driver_license_form_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = driver_id(&raw)?;
    let driver = run_store(&state, "get_driver", move |s| s.get_driver(id)).await?;
    Ok(json_view(&FormViewDto {
        form: json!(LicenseUpdateForm {
            license_number: driver.license_number.into_inner(),
        }),
        previous: previous_page(&headers),
        choices: None,
    }))
}

pub(crate) async fn driver_license_update_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
    body: Bytes,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = driver_id(&raw)?;
    let license_number = parse_form::<LicenseUpdateForm>(&body)?.validate()?;
    run_store_write(&state, "update_license_number", move |s| {
        s.update_license_number(id, &license_number)
    })
    .await?;
    Ok(see_other(LIST_PATH))
}

pub(crate) async fn driver_delete_confirm_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = driver_id(&raw)?;
    let driver = run_store(&state, "get_driver", move |s| s.get_driver(id)).await?;
    Ok(json_view(&ConfirmDeleteDto {
        object: json!(driver_dto(&driver)),
        previous: previous_page(&headers),
    }))
}

pub(crate) async fn driver_delete_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = driver_id(&raw)?;
    run_store_write(&state, "delete_driver", move |s| s.delete_driver(id)).await?;
    Ok(see_other(LIST_PATH))
}
