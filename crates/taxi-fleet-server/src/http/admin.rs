// SPDX-License-Identifier: Apache-2.0

use crate::admin::{lookup, project_row, ModelAdmin, ADMIN_APP_LABEL, REGISTRY};
use crate::http::handlers_utilities::{json_view, run_store, HandlerResult};
use crate::session::SessionContext;
use crate::AppState;
use axum::extract::{Path, Query, State};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use taxi_fleet_api::convert::{car_dto, driver_dto, manufacturer_dto, page_info};
use taxi_fleet_api::params::{
    parse_car_search, parse_page_param, MANUFACTURER_FILTER_PARAM, SEARCH_PARAM,
};
use taxi_fleet_api::{ApiError, PageInfoDto, SessionUserDto};
use taxi_fleet_model::Driver;
use taxi_fleet_store::{Page, StoreError};

#[derive(Debug, Serialize)]
struct AdminModelEntry {
    model: &'static str,
    name: &'static str,
    changelist: String,
}

#[derive(Debug, Serialize)]
struct AdminIndexDto {
    app: &'static str,
    user: SessionUserDto,
    models: Vec<AdminModelEntry>,
}

#[derive(Debug, Serialize)]
struct ChangelistDto {
    admin: &'static ModelAdmin,
    items: Vec<Value>,
    page: PageInfoDto,
}

/// Admin pages need a live session whose driver carries the staff flag.
async fn require_staff(state: &AppState, ctx: &SessionContext) -> Result<Driver, ApiError> {
    let actor = ctx.require_actor()?;
    let driver = run_store(state, "get_driver", move |s| match s.get_driver(actor) {
        Ok(driver) => Ok(Some(driver)),
        Err(StoreError::NotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    })
    .await?
    .ok_or_else(ApiError::unauthorized)?;
    if !driver.account.is_active || !driver.account.is_staff {
        return Err(ApiError::forbidden("staff account required"));
    }
    Ok(driver)
}

fn reject_unsupported(
    admin: &ModelAdmin,
    query: &BTreeMap<String, String>,
) -> Result<(), ApiError> {
    let present = |name: &str| query.get(name).is_some_and(|v| !v.trim().is_empty());
    if present(SEARCH_PARAM) && !admin.searchable() {
        return Err(ApiError::invalid_param(SEARCH_PARAM, &query[SEARCH_PARAM]));
    }
    if present(MANUFACTURER_FILTER_PARAM) && !admin.filters_on(MANUFACTURER_FILTER_PARAM) {
        return Err(ApiError::invalid_param(
            MANUFACTURER_FILTER_PARAM,
            &query[MANUFACTURER_FILTER_PARAM],
        ));
    }
    Ok(())
}

fn rows<T, D: Serialize>(
    admin: &'static ModelAdmin,
    page: &Page<T>,
    to_dto: impl Fn(&T) -> D,
) -> ChangelistDto {
    ChangelistDto {
        admin,
        items: page
            .items
            .iter()
            .map(|item| project_row(admin, &json!(to_dto(item))))
            .collect(),
        page: page_info(page),
    }
}

pub(crate) async fn admin_index_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> HandlerResult {
    let staff = require_staff(&state, &ctx).await?;
    Ok(json_view(&AdminIndexDto {
        app: ADMIN_APP_LABEL,
        user: SessionUserDto {
            id: staff.id.get(),
            username: staff.account.username.to_string(),
            is_staff: staff.account.is_staff,
        },
        models: REGISTRY
            .iter()
            .map(|admin| AdminModelEntry {
                model: admin.model,
                name: admin.verbose_name_plural,
                changelist: admin.changelist_path(),
            })
            .collect(),
    }))
}

pub(crate) async fn admin_changelist_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(model): Path<String>,
    Query(query): Query<BTreeMap<String, String>>,
) -> HandlerResult {
    require_staff(&state, &ctx).await?;
    let admin = lookup(&model).ok_or_else(|| ApiError::not_found("admin model", &model))?;
    reject_unsupported(admin, &query)?;
    let request = parse_page_param(&query)?;
    let view = match admin.model {
        "car" => {
            let search = parse_car_search(&query)?;
            let page = run_store(&state, "admin_search_cars", move |s| {
                s.search_cars(&search, request)
            })
            .await?;
            rows(admin, &page, car_dto)
        }
        "driver" => {
            let page = run_store(&state, "admin_list_drivers", move |s| s.list_drivers(request)).await?;
            rows(admin, &page, driver_dto)
        }
        _ => {
            let page = run_store(&state, "admin_list_manufacturers", move |s| {
                s.list_manufacturers(request)
            })
            .await?;
            rows(admin, &page, manufacturer_dto)
        }
    };
    Ok(json_view(&view))
}
