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
use taxi_fleet_api::convert::{car_choices, car_detail_dto, car_dto, page_info};
use taxi_fleet_api::params::{parse_form, parse_page_param};
use taxi_fleet_api::{ApiError, CarForm, ConfirmDeleteDto, FormViewDto, ListResponseDto};
use taxi_fleet_model::CarId;

const LIST_PATH: &str = "/cars/";

fn car_id(raw: &str) -> Result<CarId, ApiError> {
    CarId::parse(raw).map_err(|_| ApiError::not_found("car", raw))
}

fn detail_path(id: CarId) -> String {
    format!("/cars/{id}/")
}

async fn car_choices_for(state: &AppState) -> Result<taxi_fleet_api::CarChoicesDto, ApiError> {
    let (manufacturers, drivers) = run_store(state, "car_form_choices", |s| {
        Ok((s.all_manufacturers()?, s.all_drivers()?))
    })
    .await?;
    Ok(car_choices(&manufacturers, &drivers))
}

pub(crate) async fn car_list_handler(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> HandlerResult {
    let request = parse_page_param(&query)?;
    let page = run_store(&state, "list_cars", move |s| s.list_cars(request)).await?;
    Ok(json_view(&ListResponseDto {
        items: page.items.iter().map(car_dto).collect(),
        page: page_info(&page),
    }))
}

pub(crate) async fn car_detail_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
) -> HandlerResult {
    let actor = ctx.require_actor()?;
    let id = car_id(&raw)?;
    let detail = run_store(&state, "get_car_detail", move |s| s.get_car_detail(id)).await?;
    Ok(json_view(&car_detail_dto(&detail, Some(actor))))
}

pub(crate) async fn car_create_form_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    headers: HeaderMap,
) -> HandlerResult {
    ctx.require_actor()?;
    Ok(json_view(&FormViewDto {
        form: json!(CarForm::default()),
        previous: previous_page(&headers),
        choices: Some(car_choices_for(&state).await?),
    }))
}

pub(crate) async fn car_create_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    body: Bytes,
) -> HandlerResult {
    ctx.require_actor()?;
    let input = parse_form::<CarForm>(&body)?.validate()?;
    run_store_write(&state, "create_car", move |s| s.create_car(&input)).await?;
    Ok(see_other(LIST_PATH))
}

pub(crate) async fn car_update_form_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = car_id(&raw)?;
    let detail = run_store(&state, "get_car_detail", move |s| s.get_car_detail(id)).await?;
    let form = CarForm {
        model: detail.car.model.clone(),
        manufacturer: Some(detail.manufacturer.id.get()),
        drivers: detail.drivers.iter().map(|d| d.id.get()).collect(),
    };
    Ok(json_view(&FormViewDto {
        form: json!(form),
        previous: previous_page(&headers),
        choices: Some(car_choices_for(&state).await?),
    }))
}

pub(crate) async fn car_update_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
    body: Bytes,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = car_id(&raw)?;
    let input = parse_form::<CarForm>(&body)?.validate()?;
    run_store_write(&state, "update_car", move |s| s.update_car(id, &input)).await?;
    Ok(see_other(&detail_path(id)))
}

/// Adds or removes the logged-in driver on the car, then shows the car again.
pub(crate) async fn car_toggle_assign_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
) -> HandlerResult {
    let actor = ctx.require_actor()?;
    let id = car_id(&raw)?;
    run_store_write(&state, "toggle_car_driver", move |s| {
        s.toggle_car_driver(actor, id)
    })
    .await?;
    Ok(see_other(&detail_path(id)))
}

pub(crate) async fn car_delete_confirm_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = car_id(&raw)?;
    let listing = run_store(&state, "get_car", move |s| s.get_car(id)).await?;
    Ok(json_view(&ConfirmDeleteDto {
        object: json!(car_dto(&listing)),
        previous: previous_page(&headers),
    }))
}

pub(crate) async fn car_delete_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = car_id(&raw)?;
    run_store_write(&state, "delete_car", move |s| s.delete_car(id)).await?;
    Ok(see_other(LIST_PATH))
}
