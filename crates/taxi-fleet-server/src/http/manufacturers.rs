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
use taxi_fleet_api::convert::{manufacturer_dto, page_info};
use taxi_fleet_api::params::{parse_form, parse_page_param};
use taxi_fleet_api::{ApiError, ConfirmDeleteDto, FormViewDto, ListResponseDto, ManufacturerForm};
use taxi_fleet_model::ManufacturerId;

const LIST_PATH: &str = "/manufacturers/";

fn manufacturer_id(raw: &str) -> Result<ManufacturerId, ApiError> {
    ManufacturerId::parse(raw).map_err(|_| ApiError::not_found("manufacturer", raw))
}

pub(crate) async fn manufacturer_list_handler(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> HandlerResult {
    let request = parse_page_param(&query)?;
    let page = run_store(&state, "list_manufacturers", move |s| {
        s.list_manufacturers(request)
    })
    .await?;
    Ok(json_view(&ListResponseDto {
        items: page.items.iter().map(manufacturer_dto).collect(),
        page: page_info(&page),
    }))
}

pub(crate) async fn manufacturer_create_form_handler(
    ctx: SessionContext,
    headers: HeaderMap,
) -> HandlerResult {
    ctx.require_actor()?;
    Ok(json_view(&FormViewDto {
        form: json!(ManufacturerForm::default()),
        previous: previous_page(&headers),
        choices: None,
    }))
}

pub(crate) async fn manufacturer_create_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    body: Bytes,
) -> HandlerResult {
    ctx.require_actor()?;
    let input = parse_form::<ManufacturerForm>(&body)?.validate()?;
    run_store_write(&state, "create_manufacturer", move |s| {
        s.create_manufacturer(&input)
    })
    .await?;
    Ok(see_other(LIST_PATH))
}

pub(crate) async fn manufacturer_update_form_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = manufacturer_id(&raw)?;
    let current = run_store(&state, "get_manufacturer", move |s| s.get_manufacturer(id)).await?;
    Ok(json_view(&FormViewDto {
        form: json!(ManufacturerForm {
            name: current.name,
            country: current.country,
        }),
        previous: previous_page(&headers),
        choices: None,
    }))
}

pub(crate) async fn manufacturer_update_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
    body: Bytes,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = manufacturer_id(&raw)?;
    let input = parse_form::<ManufacturerForm>(&body)?.validate()?;
    run_store_write(&state, "update_manufacturer", move |s| {
        s.update_manufacturer(id, &input)
    })
    .await?;
    Ok(see_other(LIST_PATH))
}

pub(crate) async fn manufacturer_delete_confirm_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = manufacturer_id(&raw)?;
    let current = run_store(&state, "get_manufacturer", move |s| s.get_manufacturer(id)).await?;
    Ok(json_view(&ConfirmDeleteDto {
        object: json!(manufacturer_dto(&current)),
        previous: previous_page(&headers),
    }))
}

pub(crate) async fn manufacturer_delete_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(raw): Path<String>,
) -> HandlerResult {
    ctx.require_actor()?;
    let id = manufacturer_id(&raw)?;
    run_store_write(&state, "delete_manufacturer", move |s| s.delete_manufacturer(id)).await?;
    Ok(see_other(LIST_PATH))
}
